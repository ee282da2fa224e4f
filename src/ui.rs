use crate::app::{
    App, ChangesTab, Detail, InputKind, ModalState, PaneFocus, PreferenceField, RefLine,
};
use crate::domain::{CommitDetails, DiffLine, DiffOrigin, FileLines};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

const HIGHLIGHT_SYMBOL: &str = "▶ ";
// Status symbol plus one space in front of every changed-file label.
const STATUS_PREFIX_WIDTH: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PaneLayout {
    pub refs: Rect,
    pub changes: Rect,
    pub commits: Rect,
    pub detail: Rect,
    pub log: Rect,
    pub status: Rect,
}

pub(crate) fn pane_layout(area: Rect) -> PaneLayout {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(outer[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(45),
            Constraint::Percentage(20),
        ])
        .split(main[1]);

    PaneLayout {
        refs: left[0],
        changes: left[1],
        commits: right[0],
        detail: right[1],
        log: right[2],
        status: outer[1],
    }
}

pub(crate) fn change_label_width(area: Rect) -> i32 {
    let pane = pane_layout(area).changes;
    let symbol = u16::try_from(HIGHLIGHT_SYMBOL.chars().count()).unwrap_or(u16::MAX);
    let inner = pane
        .width
        .saturating_sub(2)
        .saturating_sub(symbol)
        .saturating_sub(STATUS_PREFIX_WIDTH);
    i32::from(inner)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let layout = pane_layout(frame.area());

    draw_refs(frame, app, layout.refs);
    draw_changes(frame, app, layout.changes);
    draw_commits(frame, app, layout.commits);
    draw_detail(frame, app, layout.detail);
    draw_logs(frame, app, layout.log);
    draw_status_bar(frame, app, layout.status);
    draw_modal(frame, app);
}

fn border_style(app: &App, pane: PaneFocus) -> Style {
    if app.focus == pane {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightGreen)
        .add_modifier(Modifier::BOLD)
}

fn draw_refs(frame: &mut Frame, app: &App, area: Rect) {
    let lines = app.ref_lines();
    let items: Vec<ListItem> = lines
        .iter()
        .map(|line| match line {
            RefLine::Section(kind) => ListItem::new(Line::from(Span::styled(
                kind.title().to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))),
            RefLine::Node { kind, row } => {
                let indent = "  ".repeat(row.depth + 1);
                let text = if row.is_group {
                    let marker = if row.expanded { "▾" } else { "▸" };
                    format!("{indent}{marker} {}", row.content.decorated().trim_start())
                } else {
                    format!("{indent}{}", row.content.decorated())
                };
                let style = match &row.content.entry {
                    Some(entry) if entry.is_head && !row.is_group => {
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                    }
                    _ if row.is_group => Style::default().fg(Color::LightBlue),
                    _ => Style::default(),
                };
                let mut spans = vec![Span::styled(text, style)];
                if !row.is_group && app.focus == PaneFocus::Refs {
                    spans.push(Span::styled(
                        format!("  [{}]", kind.affordance()),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Branches ")
                .borders(Borders::ALL)
                .border_style(border_style(app, PaneFocus::Refs)),
        )
        .highlight_style(highlight_style())
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = ListState::default();
    if !lines.is_empty() {
        state.select(Some(app.ref_selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_changes(frame: &mut Frame, app: &App, area: Rect) {
    let tab = app.changes_tab;
    let items: Vec<ListItem> = app
        .change_files(tab)
        .iter()
        .zip(app.change_labels(tab))
        .map(|(file, label)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", file.status.as_symbol()),
                    Style::default().fg(status_color(tab)),
                ),
                Span::raw(label.rendered().to_string()),
            ]))
        })
        .collect();

    let title = format!(
        " {} ({}) | {} ({}) ",
        ChangesTab::Unstaged.title(),
        app.changes.unstaged.len(),
        ChangesTab::Staged.title(),
        app.changes.staged.len(),
    );

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .title_bottom(format!(
                    " showing: {} | {} files changed ",
                    tab.title(),
                    app.changes.files_changed()
                ))
                .borders(Borders::ALL)
                .border_style(border_style(app, PaneFocus::Changes)),
        )
        .highlight_style(highlight_style())
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = ListState::default();
    if !app.change_files(tab).is_empty() {
        state.select(Some(app.change_selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn status_color(tab: ChangesTab) -> Color {
    match tab {
        ChangesTab::Unstaged => Color::Red,
        ChangesTab::Staged => Color::Green,
    }
}

fn draw_commits(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .commits
        .iter()
        .map(|commit| {
            let mut spans = vec![
                Span::styled(
                    commit.short_oid().to_string(),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(" "),
            ];
            if commit.parents.len() > 1 {
                spans.push(Span::styled("M ", Style::default().fg(Color::Magenta)));
            }
            if !commit.refs.is_empty() {
                spans.push(Span::styled(
                    format!("({}) ", commit.refs.join(", ")),
                    Style::default().fg(Color::LightCyan),
                ));
            }
            spans.push(Span::raw(commit.summary.clone()));
            spans.push(Span::styled(
                format!("  {}", commit.author),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Commits ")
                .borders(Borders::ALL)
                .border_style(border_style(app, PaneFocus::Commits)),
        )
        .highlight_style(highlight_style())
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = ListState::default();
    if !app.commits.is_empty() {
        state.select(Some(app.commit_selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.detail {
        Detail::Empty => vec![
            Line::from("Nothing loaded."),
            Line::from("Enter on a changed file: diff, Enter on a commit: details"),
        ],
        Detail::File(file) => file_lines(file),
        Detail::Commit(details) => commit_lines(details),
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" {} ", app.detail_title()))
                .borders(Borders::ALL)
                .border_style(border_style(app, PaneFocus::Detail)),
        )
        .scroll((app.detail_scroll.min(u16::MAX as usize) as u16, 0))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn draw_logs(frame: &mut Frame, app: &App, area: Rect) {
    let end = app.logs.len().saturating_sub(app.log_tail_offset);
    let lines: Vec<Line> = app.logs[..end]
        .iter()
        .rev()
        .take(200)
        .rev()
        .map(|line| Line::from(line.as_str()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Log ")
                .borders(Borders::ALL)
                .border_style(border_style(app, PaneFocus::Log)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let busy = if app.busy { "BUSY" } else { "IDLE" };
    let mut spans = vec![
        Span::styled(
            format!(" {} ", busy),
            if app.busy {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            },
        ),
        Span::raw("  "),
    ];

    if let Some(operation) = app.general.operation_in_progress() {
        spans.push(Span::styled(
            format!(" {operation} "),
            Style::default().bg(Color::Magenta).fg(Color::White),
        ));
        spans.push(Span::raw("  "));
    }

    match &app.status_line {
        Some(message) => spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        None => spans.push(Span::styled(
            "tab focus | j/k move | s/u stage | c commit | f/p/P fetch/pull/push | ? help",
            Style::default().fg(Color::Gray),
        )),
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn draw_modal(frame: &mut Frame, app: &App) {
    match &app.modal {
        ModalState::None => {}
        ModalState::Help => {
            let area = centered_rect(60, 70, frame.area());
            frame.render_widget(Clear, area);
            let lines: Vec<Line> = HELP_LINES.iter().map(|line| Line::from(*line)).collect();
            let p = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(" Keys ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(p, area);
        }
        ModalState::Input { kind, value } => {
            draw_input(frame, kind.prompt(), value, input_title(*kind));
        }
        ModalState::Password { username, value } => {
            let masked = "*".repeat(value.chars().count());
            let prompt = format!("password for {username}");
            draw_input(frame, &prompt, &masked, " Credentials ");
        }
        ModalState::Confirm { prompt, .. } => {
            let area = centered_rect(60, 30, frame.area());
            frame.render_widget(Clear, area);
            let lines = vec![
                Line::from(prompt.as_str()),
                Line::from(""),
                Line::from("y / Enter: confirm  n / Esc: cancel"),
            ];
            let p = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(" Confirm ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::LightRed)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(p, area);
        }
        ModalState::Preferences {
            draft,
            field,
            limit_text,
        } => {
            let area = centered_rect(60, 35, frame.area());
            frame.render_widget(Clear, area);
            let selected = |candidate: PreferenceField| {
                if *field == candidate {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                }
            };
            let lines = vec![
                Line::from(format!("commit limit: {limit_text}"))
                    .style(selected(PreferenceField::CommitLimit)),
                Line::from(format!(
                    "prune on fetch: {}",
                    if draft.prune_on_fetch { "yes" } else { "no" }
                ))
                .style(selected(PreferenceField::PruneOnFetch)),
                Line::from(""),
                Line::from("j/k: field  digits: limit  space: toggle  Enter: save  Esc: cancel"),
            ];
            let p = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(" Preferences ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::LightBlue)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(p, area);
        }
    }
}

fn input_title(kind: InputKind) -> &'static str {
    match kind {
        InputKind::CommitMessage { .. } => " Commit ",
        InputKind::BranchName => " New Branch ",
        InputKind::Username => " Credentials ",
    }
}

fn draw_input(frame: &mut Frame, prompt: &str, value: &str, title: &str) {
    let area = centered_rect(70, 25, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(prompt.to_string()),
        Line::from(format!("> {}", value)).style(Style::default().fg(Color::Yellow)),
        Line::from(""),
        Line::from("Enter: confirm  Esc: cancel"),
    ];

    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightBlue)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(p, area);
}

const HELP_LINES: &[&str] = &[
    "tab        cycle focus",
    "j/k        move / scroll",
    "h/l        collapse / expand group, switch changes tab",
    "Enter      toggle group, checkout ref, show diff, show commit",
    "D          delete selected ref",
    "b          new branch",
    "s / u      stage / unstage selected file",
    "A          stage all",
    "[ / ]      unstaged / staged tab",
    "c / C      commit / commit and push",
    "f p P      fetch / pull / push",
    "F          force push",
    "r          refresh",
    "o          preferences",
    "q          quit",
];

fn file_lines(file: &FileLines) -> Vec<Line<'static>> {
    let language = detect_language(&file.file_type);
    file.lines
        .iter()
        .map(|line| colorized_diff_line(line, language))
        .collect()
}

fn commit_lines(details: &CommitDetails) -> Vec<Line<'static>> {
    let summary = &details.summary;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("commit {}", summary.oid),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(format!("Author: {}", summary.author)),
        Line::from(format!("Date:   {} (unix)", summary.time)),
    ];
    if summary.parents.len() > 1 {
        lines.push(Line::from(format!("Merge:  {}", summary.parents.join(" "))));
    }
    lines.push(Line::from(""));
    lines.extend(
        details
            .message
            .lines()
            .map(|line| Line::from(format!("    {line}"))),
    );
    lines.push(Line::from(""));
    lines.extend(details.files.iter().map(|file| {
        Line::from(vec![
            Span::styled(
                format!("{} ", file.status.as_symbol()),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(file.path.clone()),
        ])
    }));
    lines
}

fn colorized_diff_line(line: &DiffLine, language: SyntaxLanguage) -> Line<'static> {
    match line.origin {
        DiffOrigin::FileHeader => Line::from(Span::styled(
            line.content.clone(),
            Style::default().fg(Color::Cyan),
        )),
        DiffOrigin::HunkHeader => Line::from(Span::styled(
            line.content.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        DiffOrigin::Context | DiffOrigin::Addition | DiffOrigin::Deletion => {
            let gutter = format!(
                "{:>4} {:>4} {}",
                lineno(line.old_lineno),
                lineno(line.new_lineno),
                line.origin.marker()
            );
            let gutter_style = match line.origin {
                DiffOrigin::Addition => Style::default().fg(Color::Green),
                DiffOrigin::Deletion => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::DarkGray),
            };
            let mut spans = vec![Span::styled(gutter, gutter_style)];
            spans.extend(colorized_code_line(&line.content, language));
            Line::from(spans)
        }
    }
}

fn lineno(value: Option<u32>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyntaxLanguage {
    Rust,
    Shell,
    Python,
    JsTs,
    Json,
    Toml,
    Yaml,
    Plain,
}

fn detect_language(file_type: &str) -> SyntaxLanguage {
    match file_type {
        "rs" => SyntaxLanguage::Rust,
        "sh" | "bash" | "zsh" => SyntaxLanguage::Shell,
        "py" => SyntaxLanguage::Python,
        "js" | "mjs" | "cjs" | "ts" | "tsx" | "jsx" => SyntaxLanguage::JsTs,
        "json" => SyntaxLanguage::Json,
        "toml" => SyntaxLanguage::Toml,
        "yaml" | "yml" => SyntaxLanguage::Yaml,
        _ => SyntaxLanguage::Plain,
    }
}

fn colorized_code_line(line: &str, language: SyntaxLanguage) -> Vec<Span<'static>> {
    let (code, comment) = split_comment(line, language);
    let mut spans = colorize_code_tokens(code, language);
    if let Some(comment) = comment {
        spans.push(Span::styled(
            comment.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans
}

fn split_comment(line: &str, language: SyntaxLanguage) -> (&str, Option<&str>) {
    let marker = match language {
        SyntaxLanguage::Rust | SyntaxLanguage::JsTs => Some("//"),
        SyntaxLanguage::Shell
        | SyntaxLanguage::Python
        | SyntaxLanguage::Toml
        | SyntaxLanguage::Yaml => Some("#"),
        SyntaxLanguage::Json | SyntaxLanguage::Plain => None,
    };

    if let Some(marker) = marker
        && let Some(idx) = line.find(marker)
    {
        return (&line[..idx], Some(&line[idx..]));
    }

    (line, None)
}

fn colorize_code_tokens(code: &str, language: SyntaxLanguage) -> Vec<Span<'static>> {
    if language == SyntaxLanguage::Plain {
        return vec![Span::raw(code.to_string())];
    }

    let chars: Vec<char> = code.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '"' || ch == '\'' {
            let start = i;
            i += 1;
            while i < chars.len() {
                if chars[i] == ch && chars[i - 1] != '\\' {
                    i += 1;
                    break;
                }
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            spans.push(Span::styled(token, Style::default().fg(Color::Yellow)));
            continue;
        }

        if ch.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            spans.push(Span::styled(token, Style::default().fg(Color::Magenta)));
            continue;
        }

        if is_word_start(ch) {
            let start = i;
            while i < chars.len() && is_word(chars[i]) {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            if keywords(language).contains(&token.as_str()) {
                spans.push(Span::styled(
                    token,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::from(token));
            }
            continue;
        }

        let start = i;
        i += 1;
        while i < chars.len()
            && !is_word_start(chars[i])
            && !chars[i].is_ascii_digit()
            && chars[i] != '"'
            && chars[i] != '\''
        {
            i += 1;
        }
        let token: String = chars[start..i].iter().collect();
        spans.push(Span::styled(token, Style::default().fg(Color::Gray)));
    }

    spans
}

fn is_word_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn keywords(language: SyntaxLanguage) -> &'static [&'static str] {
    match language {
        SyntaxLanguage::Rust => &[
            "fn", "let", "mut", "pub", "struct", "enum", "impl", "use", "mod", "match", "if",
            "else", "for", "while", "loop", "return", "async", "await", "trait", "where", "self",
            "Self",
        ],
        SyntaxLanguage::Shell => &[
            "if", "then", "else", "fi", "for", "in", "do", "done", "case", "esac", "function",
            "export", "local",
        ],
        SyntaxLanguage::Python => &[
            "def", "class", "if", "elif", "else", "for", "while", "try", "except", "finally",
            "return", "import", "from", "as", "with", "lambda",
        ],
        SyntaxLanguage::JsTs => &[
            "function", "const", "let", "var", "if", "else", "for", "while", "return", "import",
            "from", "export", "class", "async", "await", "type", "interface",
        ],
        SyntaxLanguage::Json | SyntaxLanguage::Toml | SyntaxLanguage::Yaml => {
            &["true", "false", "null"]
        }
        SyntaxLanguage::Plain => &[],
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::AppConfig;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn change_label_width_tracks_pane_width() {
        assert_eq!(change_label_width(Rect::new(0, 0, 100, 40)), 24);
        assert_eq!(change_label_width(Rect::new(0, 0, 4, 40)), 0);
    }

    #[test]
    fn layout_covers_the_whole_area() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = pane_layout(area);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.refs.width, layout.changes.width);
        assert_eq!(layout.refs.width + layout.commits.width, area.width);
    }

    #[test]
    fn comment_is_split_from_code() {
        assert_eq!(
            split_comment("let x = 1; // note", SyntaxLanguage::Rust),
            ("let x = 1; ", Some("// note"))
        );
        assert_eq!(split_comment("a # b", SyntaxLanguage::Plain), ("a # b", None));
    }

    #[test]
    fn keywords_are_highlighted() {
        let spans = colorize_code_tokens("fn main", SyntaxLanguage::Rust);
        assert_eq!(spans[0].content, "fn");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn diff_lines_show_both_line_numbers() {
        let line = DiffLine {
            old_lineno: Some(3),
            new_lineno: Some(4),
            origin: DiffOrigin::Context,
            content: "x".to_string(),
        };
        let rendered = colorized_diff_line(&line, SyntaxLanguage::Plain);
        assert_eq!(rendered.spans[0].content, "   3    4  ");
    }

    #[test]
    fn draw_renders_status_and_panes() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        let mut app = App::new(AppConfig::default());
        app.busy = true;

        terminal
            .draw(|frame| draw(frame, &app))
            .expect("draw succeeds");

        let buffer = terminal.backend().buffer();
        let text: String = buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("BUSY"));
        assert!(text.contains("Branches"));
        assert!(text.contains("Commits"));
    }
}
