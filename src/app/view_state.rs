//! Client view state and its transitions.
//!
//! [`reduce`] is the only way the view changes: it takes the current state and
//! an [`Action`] and returns the next state, without doing any I/O. The
//! terminal runtime performs the HTTP calls and feeds their outcomes back in
//! as actions.

use derivative::Derivative;

use crate::app::models::{ListQuery, SortDirection, SortField, Task, TaskPayload, TaskStatus};
use crate::app::task_edit::{FormAction, TaskForm};
use crate::app::task_list;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    Create,
    #[default]
    Active,
    Done,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Create, Tab::Active, Tab::Done];

    // Status shown by a list tab; the Create tab shows none
    pub const fn status(self) -> Option<TaskStatus> {
        match self {
            Tab::Create => None,
            Tab::Active => Some(TaskStatus::Active),
            Tab::Done => Some(TaskStatus::Done),
        }
    }

    pub const fn for_status(status: TaskStatus) -> Tab {
        match status {
            TaskStatus::Active => Tab::Active,
            TaskStatus::Done => Tab::Done,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Tab::Create => "Create",
            Tab::Active => "Active",
            Tab::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

// The task the form is editing, with the status it will be saved under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTarget {
    pub id: i64,
    pub status: TaskStatus,
}

// Operations whose failures are shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Save,
    StatusChange,
    Delete,
}

impl Operation {
    const fn error_prefix(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch data: ",
            Operation::Save => "Error saving task: ",
            Operation::StatusChange => "Error updating status: ",
            Operation::Delete => "Error deleting task: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Derivative)]
#[derivative(Default)]
pub struct ViewState {
    pub tab: Tab,
    pub sort: SortConfig,
    pub tasks: Vec<Task>,
    pub selected: Option<usize>,
    #[derivative(Default(value = "true"))]
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub form: TaskForm,
    pub editing: Option<EditTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectTab(Tab),
    ToggleSort(SortField),
    FetchStarted,
    TasksLoaded(Vec<Task>),
    SelectNext,
    SelectPrevious,
    EditTask(Task),
    Form(FormAction),
    ResetForm,
    Saved(Task),
    StatusChanged { id: i64, status: TaskStatus },
    Deleted { id: i64 },
    ShowError(String),
    Failed { operation: Operation, message: String },
}

// A save the runtime should send: POST when `id` is None, PUT otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: Option<i64>,
    pub payload: TaskPayload,
}

pub fn reduce(mut state: ViewState, action: Action) -> ViewState {
    match action {
        Action::SelectTab(tab) => {
            state.tab = tab;
            state.success = None;
            state.error = None;
            if tab == Tab::Create {
                state.loading = false;
                reset_form(&mut state);
            } else {
                state.loading = true;
            }
        }
        Action::ToggleSort(field) => {
            state.sort = if state.sort.field == field {
                SortConfig {
                    field,
                    direction: state.sort.direction.reversed(),
                }
            } else {
                SortConfig {
                    field,
                    direction: SortDirection::Asc,
                }
            };
            state.loading = state.tab != Tab::Create;
        }
        Action::FetchStarted => state.loading = true,
        Action::TasksLoaded(tasks) => {
            state.selected = match state.selected {
                _ if tasks.is_empty() => None,
                Some(i) => Some(i.min(tasks.len() - 1)),
                None => None,
            };
            state.tasks = tasks;
            state.error = None;
            state.loading = false;
        }
        Action::SelectNext => {
            state.selected = task_list::next_index(state.selected, state.tasks.len());
        }
        Action::SelectPrevious => {
            state.selected = task_list::previous_index(state.selected, state.tasks.len());
        }
        Action::EditTask(task) => {
            state.tab = Tab::Create;
            state.loading = false;
            state.editing = Some(EditTarget {
                id: task.id,
                status: task.status,
            });
            state.form = TaskForm::from_task(&task);
            state.success = None;
            state.error = None;
        }
        Action::Form(form_action) => state.form.apply(form_action),
        Action::ResetForm => reset_form(&mut state),
        Action::Saved(task) => {
            state.error = None;
            match state.editing {
                Some(_) => {
                    state.success = Some("Task updated successfully.".to_string());
                    state.tab = Tab::for_status(task.status);
                    state.loading = true;
                }
                None => state.success = Some("Task created successfully.".to_string()),
            }
            reset_form(&mut state);
        }
        Action::StatusChanged { id, status } => {
            state.success = Some(format!("Task moved to {status}."));
            state.error = None;
            reset_form_if_editing(&mut state, id);
        }
        Action::Deleted { id } => {
            state.success = Some("Task deleted successfully.".to_string());
            state.error = None;
            reset_form_if_editing(&mut state, id);
        }
        Action::ShowError(message) => state.error = Some(message),
        Action::Failed { operation, message } => {
            state.error = Some(format!("{}{message}", operation.error_prefix()));
            if operation == Operation::Fetch {
                state.loading = false;
            }
        }
    }
    state
}

fn reset_form(state: &mut ViewState) {
    state.form = TaskForm::default();
    state.editing = None;
}

fn reset_form_if_editing(state: &mut ViewState, id: i64) {
    if state.editing.map(|target| target.id) == Some(id) {
        reset_form(state);
    }
}

// The listing the current tab needs, or None on the Create tab
pub fn list_query(state: &ViewState) -> Option<ListQuery> {
    state.tab.status().map(|status| ListQuery {
        status: Some(status),
        sort: state.sort.field,
        direction: state.sort.direction,
    })
}

pub fn selected_task(state: &ViewState) -> Option<&Task> {
    state.selected.and_then(|i| state.tasks.get(i))
}

// Build the request for saving the form.
// Edits keep the status the task had when it was opened; new tasks start active.
pub fn submission(state: &ViewState) -> Result<Submission, String> {
    let form = &state.form;
    let title = form.title.trim();
    if title.is_empty() {
        return Err("Title is required".to_string());
    }

    let due_date = form.due_date.trim();
    let status = state
        .editing
        .map_or(TaskStatus::Active, |target| target.status);

    Ok(Submission {
        id: state.editing.map(|target| target.id),
        payload: TaskPayload {
            title: title.to_string(),
            description: Some(form.description.clone()),
            due_date: (!due_date.is_empty()).then(|| due_date.to_string()),
            notes: Some(form.notes.clone()),
            status: Some(status),
        },
    })
}
