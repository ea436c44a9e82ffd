mod components;
pub mod theme;
mod views;

use crate::app::{App, Mode, ViewState};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let theme = Theme::of(app.theme());

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(2), // Filter bar
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  components::filter_bar::draw_filter_bar(
    frame,
    chunks[0],
    &app.title(),
    app.state(),
    app.data_source(),
    &theme,
  );

  if let Some(view) = app.current_view() {
    match view {
      ViewState::ProductList { selected, loading } => {
        views::products::draw_products(
          frame,
          chunks[1],
          app.state().filtered(),
          *selected,
          *loading,
          app.state().view(),
          &theme,
        );
      }
      ViewState::ProductDetail { product } => {
        views::product_detail::draw_product_detail(frame, chunks[1], product, &theme);
      }
    }
  }

  draw_status_bar(frame, chunks[2], app, &theme);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      if let Some(status) = app.status_line() {
        (status.to_string(), Style::default().fg(theme.accent))
      } else {
        let hint =
          " :command  /поиск  j/k:навигация  c:категория  s:сортировка  v:вид  t:тема  r:обновить  q:назад";
        (hint.to_string(), Style::default().fg(theme.muted))
      }
    }
    Mode::Command => {
      let mut content = format!(":{}", app.command_input());
      let suggestions = app.autocomplete_suggestions();
      if !suggestions.is_empty() {
        let labels: Vec<String> = suggestions
          .iter()
          .enumerate()
          .map(|(i, cmd)| {
            if i == app.selected_suggestion() {
              format!("[{}]", cmd.name)
            } else {
              cmd.name.to_string()
            }
          })
          .collect();
        content.push_str("    ");
        content.push_str(&labels.join(" "));
        if let Some(cmd) = suggestions.get(app.selected_suggestion()) {
          content.push_str(&format!("  ({})", cmd.description));
        }
      }
      (content, Style::default().fg(Color::Yellow))
    }
    Mode::Search => {
      let search = format!("/{}", app.state().search());
      (search, Style::default().fg(theme.accent))
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}
