//! Filter bar: category tabs, sort order, result count, data source.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::catalog::{CatalogState, Category, CategoryFilter, DataSource};
use crate::ui::theme::Theme;

pub fn draw_filter_bar(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  state: &CatalogState,
  source: Option<DataSource>,
  theme: &Theme,
) {
  let mut spans: Vec<Span> = vec![
    Span::styled(
      format!(" {} ", title),
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    ),
    Span::raw(" "),
  ];

  // Category tabs: "all" plus each real category
  spans.push(tab_span(
    CategoryFilter::All.label(),
    state.category() == CategoryFilter::All,
    theme,
  ));
  for category in Category::ALL {
    spans.push(Span::raw(" "));
    spans.push(tab_span(
      category.label(),
      state.category() == CategoryFilter::Only(category),
      theme,
    ));
  }

  spans.push(Span::raw("  "));
  spans.push(Span::styled(
    format!("⇅ {}", state.sort().label()),
    Style::default().fg(theme.muted),
  ));

  if !state.search().trim().is_empty() {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("поиск: «{}»", state.search().trim()),
      Style::default().fg(theme.accent),
    ));
  }

  spans.push(Span::raw("  "));
  spans.push(Span::styled(
    format!("Товаров: {}", state.filtered().len()),
    Style::default().fg(theme.foreground),
  ));

  if let Some(source) = source {
    let (label, color) = match source {
      DataSource::Network => ("сеть", theme.price),
      DataSource::Cache => ("кэш", theme.badge_new),
      DataSource::Fallback => ("офлайн", theme.warning),
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled(format!("[{}]", label), Style::default().fg(color)));
  }

  let bar = Paragraph::new(Line::from(spans)).block(
    Block::default()
      .borders(Borders::BOTTOM)
      .border_style(Style::default().fg(theme.border)),
  );

  frame.render_widget(bar, area);
}

fn tab_span<'a>(label: &'a str, active: bool, theme: &Theme) -> Span<'a> {
  if active {
    Span::styled(
      format!("[{}]", label),
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )
  } else {
    Span::styled(label, Style::default().fg(theme.muted))
  }
}
