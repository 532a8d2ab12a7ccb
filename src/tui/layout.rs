//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph};

use super::runtime::App;
use super::style;
use crate::sim::policy::Strategy;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(10),   // chart
            Constraint::Length(3), // SOC gauge
            Constraint::Length(8), // status + totals
            Constraint::Length(3), // explanation
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_soc_gauge(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
    render_explanation(frame, app, chunks[4]);
    render_footer(frame, chunks[5]);
}

/// Header bar: scenario label, progress, speed, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state_icon, state_label) = if app.is_finished() {
        ("■", "DONE")
    } else if app.paused {
        ("‖", "PAUSED")
    } else {
        ("▶", "RUNNING")
    };

    let header = Line::from(vec![
        Span::styled(
            " FLEXKIT ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&app.label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " │ t={}/{} │ {}ms │ {} {} ",
            app.frame,
            app.total_steps,
            app.tick_interval_ms(),
            state_icon,
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// SOC trajectory of every strategy, x axis in hours.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let series: Vec<(Strategy, Vec<(f64, f64)>)> = Strategy::ALL
        .iter()
        .map(|&s| {
            let points = app
                .visible(s)
                .iter()
                .map(|r| (f64::from(r.time_hr), f64::from(r.soc)))
                .collect();
            (s, points)
        })
        .collect();

    let focused = app.focused_strategy();
    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(s, points)| {
            let mut line_style = Style::default().fg(style::strategy_color(*s));
            if *s == focused {
                line_style = line_style.add_modifier(Modifier::BOLD);
            }
            Dataset::default()
                .name(s.label())
                .marker(symbols::Marker::Braille)
                .style(line_style)
                .data(points)
        })
        .collect();

    let x_hi = f64::from(app.run().sim_config.horizon_hours()).max(1.0);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" State of Charge by Strategy ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("hour")
                .bounds([0.0, x_hi])
                .labels(vec!["0".to_string(), format!("{x_hi:.0}")]),
        )
        .y_axis(
            Axis::default()
                .title("SoC")
                .bounds([0.0, 1.0])
                .labels(vec!["0%", "50%", "100%"]),
        );

    frame.render_widget(chart, area);
}

/// Focused strategy's SOC gauge with its current action.
fn render_soc_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let soc = app.focused_soc();
    let strategy = app.focused_strategy();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(14)])
        .split(area);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!(" SOC: {} ", strategy.label()))
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(style::soc_color(soc)))
        .ratio(f64::from(soc).clamp(0.0, 1.0))
        .label(format!("{:.0}%", soc * 100.0));
    frame.render_widget(gauge, chunks[0]);

    let action = app.current_record().map(|r| r.action);
    let action_widget = Paragraph::new(Line::from(Span::styled(
        action.map_or("", |a| a.as_str()),
        Style::default()
            .fg(action.map_or(style::FOOTER_FG, style::action_color))
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(action_widget, chunks[1]);
}

/// Latest interval of the focused strategy and running totals of all.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = match app.current_record() {
        Some(r) => vec![Line::from(format!(
            "  {}  price={:>6.1}  carbon={:>5.0}  demand={:>5.2}kWh  grid={:>5.2}kWh",
            r.clock_label(),
            r.price,
            r.carbon,
            r.demand_kwh,
            r.grid_energy_kwh,
        ))],
        None => vec![Line::from("  Waiting for first interval...")],
    };

    let comparison = &app.run().comparison;
    let finished = app.is_finished();
    for &s in &Strategy::ALL {
        let (cost, co2) = app.running_totals(s);
        let mut spans = vec![Span::styled(
            format!("  {:<18}", s.label()),
            Style::default().fg(style::strategy_color(s)),
        )];
        spans.push(Span::raw(format!("cost={cost:>8.2}  co2={co2:>7.2}kg")));
        if finished && comparison.best_cost() == Some(s) {
            spans.push(Span::styled("  best cost", Style::default().fg(style::BEST)));
        }
        if finished && comparison.best_carbon() == Some(s) {
            spans.push(Span::styled("  best carbon", Style::default().fg(style::BEST)));
        }
        lines.push(Line::from(spans));
    }

    if let Some(err) = &app.error {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(style::ERROR),
        )));
    }

    let block = Block::default()
        .title(format!(" Status: {} ", app.region()))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_explanation(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Why ").borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(format!("  {}", app.explanation())).block(block),
        area,
    );
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  Space:Pause  +/-:Speed  Tab:Strategy  1-5:Region  r:Restart",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
