//! Product list and grid views.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::catalog::{Product, ViewMode};
use crate::ui::theme::Theme;

pub fn draw_products(
  frame: &mut Frame,
  area: Rect,
  products: &[Product],
  selected: usize,
  loading: bool,
  view: ViewMode,
  theme: &Theme,
) {
  let title = if loading {
    " Каталог (загрузка...) ".to_string()
  } else {
    format!(" Каталог ({}) ", products.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(theme.border));

  if products.is_empty() && !loading {
    let paragraph = Paragraph::new("Товары не найдены. Сбросьте фильтры клавишей 0.")
      .block(block)
      .style(Style::default().fg(theme.muted));
    frame.render_widget(paragraph, area);
    return;
  }

  match view {
    ViewMode::List => draw_list(frame, area, products, selected, block, theme),
    ViewMode::Grid => draw_grid(frame, area, products, selected, block, theme),
  }
}

fn draw_list(
  frame: &mut Frame,
  area: Rect,
  products: &[Product],
  selected: usize,
  block: Block<'_>,
  theme: &Theme,
) {
  let items: Vec<ListItem> = products
    .iter()
    .map(|product| {
      let mut spans = vec![
        Span::styled(
          format!("{:<36}", truncate(&product.name, 36)),
          Style::default().fg(theme.foreground),
        ),
        Span::styled(
          format!("{:<14}", product.category.label()),
          Style::default().fg(theme.muted),
        ),
        Span::styled(
          format!("{:>8} ₽", product.price),
          Style::default().fg(theme.price),
        ),
      ];
      if product.is_new {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
          "НОВИНКА",
          Style::default().fg(theme.badge_new).add_modifier(Modifier::BOLD),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(theme.selected_bg)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));

  frame.render_stateful_widget(list, area, &mut state);
}

const CARD_HEIGHT: u16 = 4;
const CARDS_PER_ROW: usize = 2;

fn draw_grid(
  frame: &mut Frame,
  area: Rect,
  products: &[Product],
  selected: usize,
  block: Block<'_>,
  theme: &Theme,
) {
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
  let selected_row = selected / CARDS_PER_ROW;

  // Scroll so the selected card's row stays visible
  let first_row = selected_row.saturating_sub(visible_rows.saturating_sub(1));

  for row in 0..visible_rows {
    let product_row = first_row + row;
    let y = inner.y + (row as u16) * CARD_HEIGHT;
    if y + CARD_HEIGHT > inner.y + inner.height {
      break;
    }

    for col in 0..CARDS_PER_ROW {
      let index = product_row * CARDS_PER_ROW + col;
      let Some(product) = products.get(index) else {
        continue;
      };

      let width = inner.width / CARDS_PER_ROW as u16;
      let card_area = Rect {
        x: inner.x + width * col as u16,
        y,
        width,
        height: CARD_HEIGHT,
      };

      draw_card(frame, card_area, product, index == selected, theme);
    }
  }
}

fn draw_card(frame: &mut Frame, area: Rect, product: &Product, selected: bool, theme: &Theme) {
  let border_style = if selected {
    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.muted)
  };

  let mut title_spans = vec![Span::styled(
    format!(" {} ", truncate(&product.name, area.width.saturating_sub(12) as usize)),
    Style::default().fg(theme.foreground),
  )];
  if product.is_new {
    title_spans.push(Span::styled(
      "NEW ",
      Style::default().fg(theme.badge_new),
    ));
  }

  let body = Line::from(vec![
    Span::styled(
      format!("{} ₽", product.price),
      Style::default().fg(theme.price).add_modifier(Modifier::BOLD),
    ),
    Span::raw("  "),
    Span::styled(product.category.label(), Style::default().fg(theme.muted)),
  ]);

  let card = Paragraph::new(body).block(
    Block::default()
      .title(Line::from(title_spans))
      .borders(Borders::ALL)
      .border_style(border_style),
  );

  frame.render_widget(card, area);
}

fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}
