use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    mem,
    time::{Duration, Instant},
};

use crate::app::client::ApiClient;
use crate::app::models::SortField;
use crate::app::task_edit::{get_task_edit_ui, FormAction};
use crate::app::task_list::*;
use crate::app::view_state::{
    list_query, reduce, selected_task, submission, Action, Operation, Tab, ViewState,
};

pub struct App {
    pub state: ViewState,
    client: ApiClient,
}

// What the event loop should do after a key press
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl App {
    pub fn new(client: ApiClient) -> App {
        App {
            state: ViewState::default(),
            client,
        }
    }

    fn dispatch(&mut self, action: Action) {
        let state = mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    // Reload the list of the current tab; the Create tab has nothing to load
    pub fn refresh(&mut self) {
        let Some(query) = list_query(&self.state) else {
            return;
        };

        self.dispatch(Action::FetchStarted);
        match self.client.list_tasks(&query) {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), ?query, "Fetched tasks");
                self.dispatch(Action::TasksLoaded(tasks));
            }
            Err(error) => {
                tracing::error!(%error, "Error fetching data");
                self.dispatch(Action::Failed {
                    operation: Operation::Fetch,
                    message: error.to_string(),
                });
            }
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        self.dispatch(Action::SelectTab(tab));
        self.refresh();
    }

    fn toggle_sort(&mut self, field: SortField) {
        self.dispatch(Action::ToggleSort(field));
        self.refresh();
    }

    // Create or update the task in the form
    fn submit(&mut self) {
        let request = match submission(&self.state) {
            Ok(request) => request,
            Err(message) => {
                self.dispatch(Action::ShowError(message));
                return;
            }
        };

        let result = match request.id {
            Some(id) => self.client.update_task(id, &request.payload),
            None => self.client.create_task(&request.payload),
        };

        match result {
            Ok(task) => {
                tracing::info!(task_id = task.id, "Saved task");
                self.dispatch(Action::Saved(task));
                self.refresh();
            }
            Err(error) => {
                tracing::error!(%error, "Error saving task");
                self.dispatch(Action::Failed {
                    operation: Operation::Save,
                    message: error.to_string(),
                });
            }
        }
    }

    fn toggle_selected_status(&mut self) {
        let Some(task) = selected_task(&self.state) else {
            return;
        };
        let (id, status) = (task.id, task.status.toggled());

        match self.client.update_status(id, status) {
            Ok(_) => {
                self.dispatch(Action::StatusChanged { id, status });
                self.refresh();
            }
            Err(error) => {
                tracing::error!(%error, task_id = id, "Error updating status");
                self.dispatch(Action::Failed {
                    operation: Operation::StatusChange,
                    message: error.to_string(),
                });
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = selected_task(&self.state).map(|task| task.id) else {
            return;
        };

        match self.client.delete_task(id) {
            Ok(_) => {
                self.dispatch(Action::Deleted { id });
                self.refresh();
            }
            Err(error) => {
                tracing::error!(%error, task_id = id, "Error deleting task");
                self.dispatch(Action::Failed {
                    operation: Operation::Delete,
                    message: error.to_string(),
                });
            }
        }
    }

    fn edit_selected(&mut self) {
        if let Some(task) = selected_task(&self.state).cloned() {
            self.dispatch(Action::EditTask(task));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match key.code {
            KeyCode::Tab => {
                self.select_tab(self.state.tab.next());
                return Flow::Continue;
            }
            KeyCode::BackTab => {
                self.select_tab(self.state.tab.previous());
                return Flow::Continue;
            }
            _ => {}
        }

        if self.state.tab == Tab::Create {
            // Handle input for the create/edit form
            match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Esc => self.dispatch(Action::ResetForm),
                KeyCode::Up => self.dispatch(Action::Form(FormAction::Up)),
                KeyCode::Down => self.dispatch(Action::Form(FormAction::Down)),
                KeyCode::Left => self.dispatch(Action::Form(FormAction::Left)),
                KeyCode::Right => self.dispatch(Action::Form(FormAction::Right)),
                KeyCode::Backspace => self.dispatch(Action::Form(FormAction::Backspace)),
                KeyCode::Char(to_insert) => {
                    self.dispatch(Action::Form(FormAction::Insert(to_insert)))
                }
                _ => {}
            }
        } else {
            // Handle input for list navigation, sorting and status changes
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
                KeyCode::Down => self.dispatch(Action::SelectNext),
                KeyCode::Up => self.dispatch(Action::SelectPrevious),
                KeyCode::Enter => self.edit_selected(),
                KeyCode::Char('s') => self.toggle_selected_status(),
                KeyCode::Char('x') => self.delete_selected(),
                KeyCode::Char('t') => self.toggle_sort(SortField::Title),
                KeyCode::Char('c') => self.toggle_sort(SortField::Created),
                KeyCode::Char('u') => self.toggle_sort(SortField::DueDate),
                KeyCode::Char('r') => self.refresh(),
                KeyCode::Char('1') => self.select_tab(Tab::Create),
                KeyCode::Char('2') => self.select_tab(Tab::Active),
                KeyCode::Char('3') => self.select_tab(Tab::Done),
                _ => {}
            }
        }
        Flow::Continue
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    app.refresh();
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &app.state))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) == Flow::Quit {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
fn draw_ui(f: &mut Frame, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.size());

    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title("ToDo App"))
        .select(state.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, rows[0]);

    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    if state.tab == Tab::Create {
        let title = if state.editing.is_some() {
            "Edit Task"
        } else {
            "Create Task"
        };
        let form = Paragraph::new(get_task_edit_ui(state))
            .block(Block::new().title(title).borders(Borders::ALL))
            .style(Style::new().white());
        f.render_widget(form, chunks[0]);
    } else {
        draw_task_list(f, state, chunks[0]);
    }

    // Display instructions and statistics in vertically split layout
    let right_side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let instructions = Paragraph::new(get_instructions_ui(state.tab))
        .block(Block::new().title("Commands").borders(Borders::ALL))
        .style(Style::new().white());

    let statistics = Paragraph::new(get_statistics_ui(state, Utc::now().date_naive()))
        .block(Block::new().title("Statistics").borders(Borders::ALL))
        .style(Style::new().white());

    f.render_widget(instructions, right_side[0]);
    f.render_widget(statistics, right_side[1]);

    f.render_widget(status_line(state), rows[2]);
}

fn draw_task_list(f: &mut Frame, state: &ViewState, area: Rect) {
    let title = match state.tab {
        Tab::Done => "Done Tasks",
        _ => "Active Tasks",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{title} | {}", get_header_ui(&state.sort)));

    if let Some(placeholder) = get_placeholder_ui(state) {
        f.render_widget(Paragraph::new(placeholder).block(block), area);
        return;
    }

    let task_list = List::new(get_list_items_ui(&state.tasks))
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut list_state = ListState::default();
    list_state.select(state.selected);
    f.render_stateful_widget(task_list, area, &mut list_state);
}

// Error wins over success; nothing is shown when there is neither
fn status_line(state: &ViewState) -> Paragraph<'static> {
    let line = match (&state.error, &state.success) {
        (Some(error), _) => Line::from(Span::styled(error.clone(), Style::new().fg(Color::Red))),
        (None, Some(success)) => {
            Line::from(Span::styled(success.clone(), Style::new().fg(Color::Green)))
        }
        (None, None) => Line::raw(""),
    };
    Paragraph::new(line).block(Block::default().borders(Borders::ALL))
}
