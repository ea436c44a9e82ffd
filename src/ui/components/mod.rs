pub mod filter_bar;
