use crate::cache::{CacheStore, MemoryStore, SqliteStore};
use crate::catalog::{
  CatalogClient, CatalogState, Category, CategoryFilter, DataSource, Product, SortKey,
};
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{CatalogEvent, Event, EventHandler};
use crate::prefs::Prefs;
use crate::ui;
use crate::ui::theme::ThemeKind;
use crate::worker::{
  CacheRouter, ControlCommand, ControlReply, FallbackContent, HttpFetcher, RouterConfig,
  WorkerNotice,
};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
  Search,
}

/// View state - each variant owns its data
#[derive(Debug)]
pub enum ViewState {
  ProductList { selected: usize, loading: bool },
  ProductDetail { product: Box<Product> },
}

impl Default for ViewState {
  fn default() -> Self {
    ViewState::ProductList {
      selected: 0,
      loading: true,
    }
  }
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<ViewState>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Application configuration
  config: Config,

  /// Catalog browsing state; all filter changes go through here
  state: CatalogState,

  /// Active color theme
  theme: ThemeKind,

  /// Persisted preferences and the offline catalog snapshot
  prefs: Prefs,

  /// Cache router, shared with the catalog client
  router: CacheRouter,

  /// Catalog loader
  client: CatalogClient,

  /// Router notices, forwarded into the event loop on startup
  notice_rx: Option<mpsc::UnboundedReceiver<WorkerNotice>>,

  /// Where the current catalog data came from
  source: Option<DataSource>,

  /// Transient message for the status bar
  status: Option<String>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, no_cache: bool) -> Result<Self> {
    let store: Arc<dyn CacheStore> = if no_cache {
      Arc::new(MemoryStore::new())
    } else {
      Arc::new(SqliteStore::open()?)
    };

    let fetcher = Arc::new(HttpFetcher::new()?);
    let fallback = FallbackContent::new(
      read_optional(config.cache.offline_page.as_deref()),
      read_optional(config.cache.placeholder_image.as_deref()),
    );

    let router_config = RouterConfig::from_config(&config)?;
    let catalog_url = config.catalog_url()?;

    let (notice_tx, notice_rx) = mpsc::unbounded_channel();
    let router = CacheRouter::new(store, fetcher, fallback, router_config, notice_tx);
    let client = CatalogClient::new(router.clone(), catalog_url);

    let prefs = Prefs::load();
    let mut state = CatalogState::new();
    state.set_view(prefs.view);
    let theme = prefs.theme;

    let (tx, _rx) = mpsc::unbounded_channel();

    Ok(Self {
      view_stack: vec![ViewState::default()],
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      config,
      state,
      theme,
      prefs,
      router,
      client,
      notice_rx: Some(notice_rx),
      source: None,
      status: None,
      event_tx: tx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Forward router notices into the event loop
    if let Some(mut notice_rx) = self.notice_rx.take() {
      let tx = self.event_tx.clone();
      tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
          if tx.send(Event::Worker(notice)).is_err() {
            break;
          }
        }
      });
    }

    // Purge cache generations from previous versions
    if let Err(e) = self.router.activate() {
      warn!("cache activation failed: {}", e);
    }

    // Precache in the background
    let router = self.router.clone();
    tokio::spawn(async move {
      router.install().await;
    });

    // Initial data load
    self.load_catalog();

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }

    // Persist theme and view mode for the next session
    self.prefs.theme = self.theme;
    self.prefs.view = self.state.view();
    if let Err(e) = self.prefs.save() {
      debug!("failed to save preferences: {}", e);
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn load_catalog(&self) {
    let client = self.client.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let _ = tx.send(Event::Catalog(CatalogEvent::Loading));
      match client.fetch_catalog().await {
        Ok(fetch) => {
          let _ = tx.send(Event::Catalog(CatalogEvent::Loaded {
            products: fetch.document.products,
            source: fetch.source,
          }));
        }
        Err(e) => {
          let _ = tx.send(Event::Error(e.to_string()));
        }
      }
    });
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Catalog(catalog_event) => self.handle_catalog_event(catalog_event),
      Event::Worker(notice) => self.handle_worker_notice(notice),
      Event::Control(reply) => self.handle_control_reply(reply),
      Event::Error(msg) => {
        self.status = Some(msg);
      }
    }
    Ok(())
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
      Mode::Search => self.handle_search_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    // Any keypress dismisses a transient status message
    self.status = None;

    match key.code {
      // Quit
      KeyCode::Char('q') => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Enter => self.enter_selected(),
      KeyCode::Esc => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        }
      }

      // Filter transitions
      KeyCode::Char('c') => {
        self.state.cycle_category();
        self.clamp_selection();
      }
      KeyCode::Char('s') => {
        self.state.cycle_sort();
        self.clamp_selection();
      }
      KeyCode::Char('0') => {
        self.state.reset_filters();
        self.clamp_selection();
      }

      // Appearance
      KeyCode::Char('v') => {
        self.state.set_view(self.state.view().toggled());
      }
      KeyCode::Char('t') => {
        self.theme = self.theme.toggled();
      }

      // Data sync
      KeyCode::Char('r') => {
        self.spawn_control(ControlCommand::SyncNow);
      }

      // Mode switches
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
      }
      KeyCode::Char('/') => {
        self.mode = Mode::Search;
        self.state.set_search("");
        self.clamp_selection();
      }

      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        // Navigate autocomplete suggestions
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        // Navigate autocomplete suggestions backwards
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0; // Reset selection on input change
      }
      _ => {}
    }
  }

  fn handle_search_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.state.set_search("");
        self.clamp_selection();
      }
      KeyCode::Enter => {
        // Keep the filter and return to normal mode
        self.mode = Mode::Normal;
      }
      KeyCode::Backspace => {
        let mut query = self.state.search().to_string();
        query.pop();
        self.state.set_search(query);
        self.clamp_selection();
      }
      KeyCode::Char(c) => {
        let mut query = self.state.search().to_string();
        query.push(c);
        self.state.set_search(query);
        self.clamp_selection();
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    // Get the command to execute - either from selected suggestion or direct input
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };

    match cmd.as_str() {
      "all" => self.select_category(CategoryFilter::All),
      "brushes" => self.select_category(CategoryFilter::Only(Category::Brushes)),
      "pastes" => self.select_category(CategoryFilter::Only(Category::Pastes)),
      "irrigators" => self.select_category(CategoryFilter::Only(Category::Irrigators)),
      "other" => self.select_category(CategoryFilter::Only(Category::Other)),
      "sync" => self.spawn_control(ControlCommand::SyncNow),
      "stats" => self.spawn_control(ControlCommand::CacheStats),
      "clear-cache" => self.spawn_control(ControlCommand::ClearCache),
      "update" => self.spawn_control(ControlCommand::CheckUpdate),
      "theme" => {
        self.theme = self.theme.toggled();
      }
      "quit" => {
        self.should_quit = true;
      }
      // Sort orders can be typed directly, e.g. `:price-asc`
      "default" | "price-asc" | "price-desc" | "new" | "name" => {
        self.state.set_sort(SortKey::from_key(&cmd));
        self.clamp_selection();
      }
      _ => {
        // Category tags can be typed directly, e.g. `:пасты`;
        // anything else is ignored
        if let CategoryFilter::Only(category) = CategoryFilter::from_tag(&cmd) {
          self.select_category(CategoryFilter::Only(category));
        }
      }
    }
    self.command_input.clear();
  }

  fn select_category(&mut self, category: CategoryFilter) {
    self.state.set_category(category);
    self.view_stack.truncate(1);
    self.clamp_selection();
  }

  fn spawn_control(&self, command: ControlCommand) {
    let router = self.router.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let reply = router.handle_command(command).await;
      let _ = tx.send(Event::Control(reply));
    });
  }

  fn handle_catalog_event(&mut self, event: CatalogEvent) {
    match event {
      CatalogEvent::Loading => {
        if let Some(ViewState::ProductList { loading, .. }) = self.view_stack.first_mut() {
          *loading = true;
        }
      }
      CatalogEvent::Loaded { products, source } => {
        self.source = Some(source);

        if source == DataSource::Fallback && products.is_empty() && !self.prefs.products.is_empty()
        {
          // Network and cache both came up empty: fall back to the
          // local snapshot from a previous session
          let snapshot = self.prefs.products.clone();
          let when = self
            .prefs
            .last_update
            .map(|t| t.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| "ранее".to_string());
          self.state.set_products(snapshot);
          self.status = Some(format!("Используем локальную копию каталога ({})", when));
        } else {
          if source == DataSource::Network && !products.is_empty() {
            self.prefs.remember_snapshot(&products);
            if let Err(e) = self.prefs.save() {
              debug!("failed to save catalog snapshot: {}", e);
            }
          }
          self.state.set_products(products);
        }

        if let Some(ViewState::ProductList { loading, .. }) = self.view_stack.first_mut() {
          *loading = false;
        }
        self.clamp_selection();
      }
    }
  }

  fn handle_worker_notice(&mut self, notice: WorkerNotice) {
    match notice {
      WorkerNotice::Installed { version } => {
        debug!("precache finished for version {}", version);
      }
      WorkerNotice::Activated { version } => {
        debug!("cache generation v{} active", version);
      }
      WorkerNotice::DataUpdated { count, .. } => {
        self.status = Some(format!("Каталог обновлен: {} товаров в кэше", count));
        // If we started offline with nothing to show, fresh data is now
        // in the cache; load it
        if self.state.products().is_empty() {
          self.load_catalog();
        }
      }
      WorkerNotice::CacheUpdated { updated } => {
        debug!("background refresh updated {} resources", updated);
      }
    }
  }

  fn handle_control_reply(&mut self, reply: ControlReply) {
    self.status = Some(match reply {
      ControlReply::CacheInfo {
        cache_name,
        version,
        ..
      } => format!("Кэш {} (версия {})", cache_name, version),
      ControlReply::ClearCache { success, message } => {
        if success {
          message
        } else {
          format!("Не удалось очистить кэш: {}", message)
        }
      }
      ControlReply::CheckUpdate { has_update } => {
        if has_update {
          "Доступна новая версия каталога".to_string()
        } else {
          "Обновлений нет".to_string()
        }
      }
      ControlReply::SyncNow { success } => {
        if success {
          "Каталог синхронизирован".to_string()
        } else {
          "Синхронизация не удалась, работаем из кэша".to_string()
        }
      }
      ControlReply::CacheStats {
        stats, cache_name, ..
      } => format!(
        "{}: всего {} (html {}, css {}, js {}, изображения {}, шрифты {}, прочее {})",
        cache_name, stats.total, stats.html, stats.css, stats.js, stats.images, stats.fonts,
        stats.other
      ),
    });
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.state.filtered().len();
    if let Some(ViewState::ProductList { selected, .. }) = self.view_stack.last_mut() {
      if len > 0 {
        *selected = (*selected as i32 + delta).rem_euclid(len as i32) as usize;
      }
    }
  }

  fn clamp_selection(&mut self) {
    let len = self.state.filtered().len();
    if let Some(ViewState::ProductList { selected, .. }) = self.view_stack.first_mut() {
      if len == 0 {
        *selected = 0;
      } else if *selected >= len {
        *selected = len - 1;
      }
    }
  }

  fn enter_selected(&mut self) {
    if let Some(ViewState::ProductList { selected, .. }) = self.view_stack.last() {
      if let Some(product) = self.state.filtered().get(*selected) {
        self.view_stack.push(ViewState::ProductDetail {
          product: Box::new(product.clone()),
        });
      }
    }
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&ViewState> {
    self.view_stack.last()
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn state(&self) -> &CatalogState {
    &self.state
  }

  pub fn theme(&self) -> ThemeKind {
    self.theme
  }

  pub fn title(&self) -> String {
    self.config.display_title()
  }

  pub fn data_source(&self) -> Option<DataSource> {
    self.source
  }

  pub fn status_line(&self) -> Option<&str> {
    self.status.as_deref()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}

fn read_optional(path: Option<&Path>) -> Option<Vec<u8>> {
  let path = path?;
  match std::fs::read(path) {
    Ok(bytes) => Some(bytes),
    Err(e) => {
      warn!("failed to read fallback file {}: {}", path.display(), e);
      None
    }
  }
}
