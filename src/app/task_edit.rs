use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::Task;
use crate::app::view_state::ViewState;

pub const FIELD_COUNT: usize = 4;

// Content of the create/edit form plus the text cursor.
// The cursor is (column in chars, field row).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub notes: String,
    cursor: (usize, usize),
}

// Keystrokes the form understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Up,
    Down,
    Left,
    Right,
    Insert(char),
    Backspace,
}

impl TaskForm {
    // Prefill the form from an existing task; missing values become empty strings
    pub fn from_task(task: &Task) -> TaskForm {
        TaskForm {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date.clone().unwrap_or_default(),
            notes: task.notes.clone().unwrap_or_default(),
            cursor: (0, 0),
        }
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::Up => self.move_cursor_up(),
            FormAction::Down => self.move_cursor_down(),
            FormAction::Left => self.move_cursor_left(),
            FormAction::Right => self.move_cursor_right(),
            FormAction::Insert(to_insert) => self.input(to_insert),
            FormAction::Backspace => self.delete_char(),
        }
    }

    // Move the cursor one field BELOW the current one, keeping the column when it fits
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor;
        let next_y = (y + 1).min(FIELD_COUNT - 1);
        self.cursor = (x.min(self.field_len(next_y)), next_y);
    }

    // Move the cursor one field ABOVE the current one, keeping the column when it fits
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor;
        let next_y = y.saturating_sub(1);
        self.cursor = (x.min(self.field_len(next_y)), next_y);
    }

    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor;
        self.cursor = (x.saturating_sub(1), y);
    }

    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor;
        self.cursor = ((x + 1).min(self.field_len(y)), y);
    }

    // Remove the char before the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor;
        if x == 0 {
            return;
        }

        let field = self.field_mut(y);
        let start = byte_offset(field, x - 1);
        field.remove(start);
        self.move_cursor_left();
    }

    // Insert a char at the cursor of the active field
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor;
        let field = self.field_mut(y);
        let at = byte_offset(field, x);
        field.insert(at, to_insert);
        self.cursor = (x + 1, y);
    }

    // Maps a field row to its content
    pub fn field(&self, y: usize) -> &str {
        match y {
            0 => &self.title,
            1 => &self.description,
            2 => &self.due_date,
            _ => &self.notes,
        }
    }

    fn field_mut(&mut self, y: usize) -> &mut String {
        match y {
            0 => &mut self.title,
            1 => &mut self.description,
            2 => &mut self.due_date,
            _ => &mut self.notes,
        }
    }

    fn field_len(&self, y: usize) -> usize {
        self.field(y).chars().count()
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

// Returns the UI content for the create/edit form
pub fn get_task_edit_ui(state: &ViewState) -> Vec<Line<'static>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

    struct FormInputLine<'a> {
        prefix: &'static str,
        placeholder: &'static str,
        value: &'a str,
    }

    let form = &state.form;
    let lines = [
        FormInputLine {
            prefix: "Title *:     ",
            placeholder: "Task title",
            value: &form.title,
        },
        FormInputLine {
            prefix: "Description: ",
            placeholder: "Task description",
            value: &form.description,
        },
        FormInputLine {
            prefix: "Due date:    ",
            placeholder: "2026-03-01",
            value: &form.due_date,
        },
        FormInputLine {
            prefix: "Notes:       ",
            placeholder: "Additional notes",
            value: &form.notes,
        },
    ];

    let (cursor_x, cursor_y) = form.cursor();
    let mut text = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let mut spans = vec![Span::styled(line.prefix, WHITE_TEXT)];

        if line.value.is_empty() {
            if cursor_y == i {
                // Selected and empty: the first placeholder char doubles as the cursor
                let mut placeholder = line.placeholder.chars();
                let first: String = placeholder.next().into_iter().collect();
                spans.push(Span::styled(first, BLACK_ON_WHITE));
                spans.push(Span::styled(placeholder.collect::<String>(), GRAY_TEXT));
            } else {
                spans.push(Span::styled(line.placeholder, GRAY_TEXT));
            }
        } else if cursor_y == i {
            let before: String = line.value.chars().take(cursor_x).collect();
            let under: String = line.value.chars().skip(cursor_x).take(1).collect();
            let after: String = line.value.chars().skip(cursor_x + 1).collect();
            spans.push(Span::styled(before, WHITE_TEXT));
            if under.is_empty() {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            } else {
                spans.push(Span::styled(under, BLACK_ON_WHITE));
            }
            spans.push(Span::styled(after, WHITE_TEXT));
        } else {
            spans.push(Span::styled(line.value.to_string(), WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));

    if let Some(target) = state.editing {
        text.push(Line::from(Span::styled(
            format!("Editing task #{} ({})", target.id, target.status),
            GRAY_TEXT,
        )));
    }

    let save_label = if state.editing.is_some() {
        "Enter - save task, Esc - cancel"
    } else {
        "Enter - create task, Esc - clear"
    };
    text.push(Line::from(Span::styled(save_label, WHITE_TEXT)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::TaskStatus;
    use chrono::Utc;

    fn typed(text: &str) -> TaskForm {
        let mut form = TaskForm::default();
        text.chars().for_each(|c| form.input(c));
        form
    }

    #[test]
    fn typing_fills_the_active_field() {
        let mut form = typed("Buy");
        form.move_cursor_down();
        "milk".chars().for_each(|c| form.input(c));

        assert_eq!(form.title, "Buy");
        assert_eq!(form.description, "milk");
        assert_eq!(form.cursor(), (4, 1));
    }

    #[test]
    fn backspace_removes_char_before_cursor() {
        let mut form = typed("abcd");
        form.move_cursor_left();
        form.delete_char();

        assert_eq!(form.title, "abd");
        assert_eq!(form.cursor(), (2, 0));
    }

    #[test]
    fn backspace_at_start_does_nothing() {
        let mut form = typed("ab");
        form.move_cursor_left();
        form.move_cursor_left();
        form.delete_char();

        assert_eq!(form.title, "ab");
        assert_eq!(form.cursor(), (0, 0));
    }

    #[test]
    fn handles_multibyte_text() {
        let mut form = typed("Grüße");
        form.move_cursor_left();
        form.input('ß');
        form.delete_char();
        form.delete_char();

        assert_eq!(form.title, "Grüe");
    }

    #[test]
    fn cursor_is_clamped_to_fields_and_content() {
        let mut form = typed("long title");
        for _ in 0..10 {
            form.move_cursor_down();
        }
        assert_eq!(form.cursor(), (0, FIELD_COUNT - 1));

        form.move_cursor_right();
        assert_eq!(form.cursor(), (0, FIELD_COUNT - 1));

        for _ in 0..10 {
            form.move_cursor_up();
        }
        assert_eq!(form.cursor(), (0, 0));
    }

    #[test]
    fn prefills_from_task() {
        let task = Task {
            id: 4,
            title: "Review".to_string(),
            description: None,
            due_date: Some("2026-02-21".to_string()),
            notes: Some("soon".to_string()),
            status: TaskStatus::Done,
            created_at: Utc::now(),
        };

        let form = TaskForm::from_task(&task);
        assert_eq!(form.title, "Review");
        assert_eq!(form.description, "");
        assert_eq!(form.due_date, "2026-02-21");
        assert_eq!(form.notes, "soon");
        assert_eq!(form.cursor(), (0, 0));
    }

    #[test]
    fn apply_routes_actions() {
        let mut form = TaskForm::default();
        form.apply(FormAction::Insert('x'));
        form.apply(FormAction::Down);
        form.apply(FormAction::Insert('y'));
        form.apply(FormAction::Up);
        form.apply(FormAction::Backspace);

        assert_eq!(form.title, "");
        assert_eq!(form.description, "y");
    }
}
