use chrono::{DateTime, Duration, NaiveDate, Utc};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::{SortDirection, SortField, Task, TaskStatus};
use crate::app::view_state::{SortConfig, Tab, ViewState};

// Index after moving the selection down, wrapping to the top
pub fn next_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match selected {
        Some(i) if i + 1 < len => Some(i + 1),
        Some(_) => Some(0),
        None => Some(0),
    }
}

// Index after moving the selection up, wrapping to the bottom
pub fn previous_index(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match selected {
        Some(0) => Some(len - 1),
        Some(i) => Some(i.min(len) - 1),
        None => Some(0),
    }
}

// Arrow shown next to a sortable column
pub fn sort_arrow(sort: &SortConfig, field: SortField) -> &'static str {
    if sort.field != field {
        return "↕";
    }
    match sort.direction {
        SortDirection::Asc => "↑",
        SortDirection::Desc => "↓",
    }
}

// Dates are shown as dd.mm.yyyy; anything unparseable is shown as "-"
pub fn format_due_date(due_date: Option<&str>) -> String {
    due_date
        .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
        .map_or_else(|| "-".to_string(), |date| date.format("%d.%m.%Y").to_string())
}

pub fn format_created(created_at: &DateTime<Utc>) -> String {
    created_at.format("%d.%m.%Y").to_string()
}

fn parsed_due_date(task: &Task) -> Option<NaiveDate> {
    task.due_date
        .as_deref()
        .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
}

// Active tasks whose due date has passed
pub fn get_overdue(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Active)
        .filter(|task| parsed_due_date(task).is_some_and(|due| due < today))
        .collect()
}

// Active tasks due between today and a week from now
pub fn get_due_next_week(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let next_week = today + Duration::weeks(1);
    tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Active)
        .filter(|task| parsed_due_date(task).is_some_and(|due| due >= today && due <= next_week))
        .collect()
}

// Column header with the current sort arrows
pub fn get_header_ui(sort: &SortConfig) -> String {
    format!(
        "Title [t] {}   Created [c] {}   Due date [u] {}",
        sort_arrow(sort, SortField::Title),
        sort_arrow(sort, SortField::Created),
        sort_arrow(sort, SortField::DueDate),
    )
}

// Build the UI (list) for the task rows
pub fn get_list_items_ui(tasks: &[Task]) -> Vec<ListItem<'_>> {
    tasks
        .iter()
        .map(|task| {
            let title_color = match task.status {
                TaskStatus::Done => Color::DarkGray,
                TaskStatus::Active => Color::White,
            };

            let lines = vec![
                Line::from(vec![
                    Span::from(match task.status {
                        TaskStatus::Done => "[✓] ",
                        TaskStatus::Active => "[ ] ",
                    }),
                    Span::from(task.title.as_str()).fg(title_color),
                ]),
                Line::from(vec![
                    Span::from(format!("    Created: {}", format_created(&task.created_at))),
                    Span::from(format!(
                        "  Due: {}",
                        format_due_date(task.due_date.as_deref())
                    )),
                    Span::from(format!("  Status: {}", task.status)),
                ]),
            ];
            ListItem::new(lines).style(Style::default().fg(Color::White))
        })
        .collect()
}

// Message shown instead of the list when there is nothing to draw
pub fn get_placeholder_ui(state: &ViewState) -> Option<&'static str> {
    if state.loading {
        return Some("Loading data...");
    }
    if state.error.is_some() || !state.tasks.is_empty() {
        return None;
    }
    match state.tab {
        Tab::Active => Some("No active tasks found."),
        Tab::Done => Some("No done tasks found."),
        Tab::Create => None,
    }
}

// Build the UI (lines) for statistics infobox
pub fn get_statistics_ui(state: &ViewState, today: NaiveDate) -> Vec<Line<'static>> {
    vec![
        Line::from(format!("Tasks listed: {}", state.tasks.len())),
        Line::from(format!("Overdue: {}", get_overdue(&state.tasks, today).len())),
        Line::from(format!(
            "Due next week: {}",
            get_due_next_week(&state.tasks, today).len()
        )),
    ]
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui(tab: Tab) -> Vec<Line<'static>> {
    match tab {
        Tab::Create => vec![
            "Type to edit the selected field".into(),
            "Up/Down - change field".into(),
            "Enter - save".into(),
            "Esc - cancel / clear".into(),
            "Tab - next tab".into(),
        ],
        Tab::Active | Tab::Done => vec![
            "Up/Down - select a task".into(),
            "Enter - edit task".into(),
            "s - toggle active/done".into(),
            "x - delete task".into(),
            "t / c / u - sort by title / created / due date".into(),
            "r - reload".into(),
            "Tab - next tab".into(),
            "q - quit".into(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn task(status: TaskStatus, due_date: Option<&str>) -> Task {
        Task {
            id: 1,
            title: "t".to_string(),
            description: None,
            due_date: due_date.map(str::to_string),
            notes: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn day(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case(None, 3, Some(0))]
    #[case(Some(0), 3, Some(1))]
    #[case(Some(2), 3, Some(0))]
    #[case(Some(1), 0, None)]
    fn moves_selection_down(
        #[case] selected: Option<usize>,
        #[case] len: usize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(next_index(selected, len), expected);
    }

    #[rstest]
    #[case(None, 3, Some(0))]
    #[case(Some(0), 3, Some(2))]
    #[case(Some(2), 3, Some(1))]
    #[case(Some(7), 3, Some(2))]
    #[case(None, 0, None)]
    fn moves_selection_up(
        #[case] selected: Option<usize>,
        #[case] len: usize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(previous_index(selected, len), expected);
    }

    #[rstest]
    #[case(SortField::Title, "↑")]
    #[case(SortField::Created, "↕")]
    #[case(SortField::DueDate, "↕")]
    fn shows_sort_arrows(#[case] field: SortField, #[case] expected: &str) {
        let sort = SortConfig {
            field: SortField::Title,
            direction: SortDirection::Asc,
        };
        assert_eq!(sort_arrow(&sort, field), expected);
    }

    #[rstest]
    #[case(Some("2026-02-21"), "21.02.2026")]
    #[case(Some("not a date"), "-")]
    #[case(None, "-")]
    fn formats_due_dates(#[case] input: Option<&str>, #[case] expected: &str) {
        assert_eq!(format_due_date(input), expected);
    }

    #[test]
    fn counts_overdue_and_upcoming_active_tasks() {
        let today = day("2026-03-10");
        let tasks = vec![
            task(TaskStatus::Active, Some("2026-03-01")),
            task(TaskStatus::Done, Some("2026-03-01")),
            task(TaskStatus::Active, Some("2026-03-12")),
            task(TaskStatus::Active, Some("2026-04-30")),
            task(TaskStatus::Active, None),
        ];

        assert_eq!(get_overdue(&tasks, today).len(), 1);
        assert_eq!(get_due_next_week(&tasks, today).len(), 1);
    }

    #[test]
    fn placeholder_depends_on_tab_and_loading() {
        let loading = ViewState::default();
        assert_eq!(get_placeholder_ui(&loading), Some("Loading data..."));

        let empty_done = ViewState {
            tab: Tab::Done,
            loading: false,
            ..ViewState::default()
        };
        assert_eq!(get_placeholder_ui(&empty_done), Some("No done tasks found."));

        let failed = ViewState {
            loading: false,
            error: Some("Failed to fetch data: offline".to_string()),
            ..ViewState::default()
        };
        assert_eq!(get_placeholder_ui(&failed), None);
    }

    #[test]
    fn header_marks_the_sorted_column() {
        let header = get_header_ui(&SortConfig::default());
        assert!(header.contains("Created [c] ↓"));
        assert!(header.contains("Title [t] ↕"));
    }
}
