use std::io::{BufRead, Write};

use anyhow::Result;
use nook_core::{NewTask, Priority, StoreError, sort_by_priority};
use nook_store::TaskStore;

const MENU: &str = "
===== To-Do List =====
1. Add task
2. View tasks
3. Mark task complete
4. Edit task
5. Delete task
6. Exit
======================";

enum Flow {
    Continue,
    Closed,
}

/// Numbered to-do menu over any line-based input and output.
pub struct Shell<'a, R, W> {
    store: &'a TaskStore,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(store: &'a TaskStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Runs until the user exits or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                break;
            };
            let flow = match choice.as_str() {
                "1" => self.add_task()?,
                "2" => self.view_tasks()?,
                "3" => self.complete_task()?,
                "4" => self.edit_task()?,
                "5" => self.delete_task()?,
                "6" => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option. Try again.")?;
                    Flow::Continue
                }
            };
            if matches!(flow, Flow::Closed) {
                break;
            }
        }
        writeln!(self.output, "\nGoodbye!")?;
        Ok(())
    }

    fn add_task(&mut self) -> Result<Flow> {
        let Some(description) = self.prompt("Enter task description: ")? else {
            return Ok(Flow::Closed);
        };
        if description.is_empty() {
            writeln!(self.output, "Task description cannot be empty.")?;
            return Ok(Flow::Continue);
        }
        let Some(raw) = self.prompt("Priority (high/medium/low) [medium]: ")? else {
            return Ok(Flow::Closed);
        };
        let priority = if raw.is_empty() {
            Priority::Medium
        } else if let Some(priority) = Priority::parse(&raw) {
            priority
        } else {
            writeln!(self.output, "Invalid priority. Using 'medium'.")?;
            Priority::Medium
        };
        self.store
            .create(&NewTask::new(description.as_str()).with_priority(priority))?;
        writeln!(
            self.output,
            "Added: \"{description}\" [{}]",
            priority.as_str()
        )?;
        Ok(Flow::Continue)
    }

    fn view_tasks(&mut self) -> Result<Flow> {
        let mut tasks = self.store.list()?;
        if tasks.is_empty() {
            writeln!(self.output, "No tasks found.")?;
            return Ok(Flow::Continue);
        }
        sort_by_priority(&mut tasks);
        writeln!(
            self.output,
            "\n{:<5} {:<10} {:<12} Description",
            "ID", "Priority", "Status"
        )?;
        writeln!(self.output, "{}", "-".repeat(55))?;
        for task in &tasks {
            let status = if task.completed { "[done]" } else { "[pending]" };
            writeln!(
                self.output,
                "{:<5} {:<10} {:<12} {}",
                task.id,
                task.priority.as_str(),
                status,
                task.description
            )?;
        }
        writeln!(self.output)?;
        Ok(Flow::Continue)
    }

    fn complete_task(&mut self) -> Result<Flow> {
        self.view_tasks()?;
        let Some(id) = self.prompt_id("Enter task ID to mark complete: ")? else {
            return Ok(Flow::Closed);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        if self.store.mark_complete(id)? {
            writeln!(self.output, "Task {id} marked as complete.")?;
        } else {
            writeln!(self.output, "Task not found or already completed.")?;
        }
        Ok(Flow::Continue)
    }

    fn edit_task(&mut self) -> Result<Flow> {
        self.view_tasks()?;
        let Some(id) = self.prompt_id("Enter task ID to edit: ")? else {
            return Ok(Flow::Closed);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        let Some(task) = self.store.get(id)? else {
            writeln!(self.output, "Task not found.")?;
            return Ok(Flow::Continue);
        };

        let Some(description) = self.prompt(&format!("New description [{}]: ", task.description))?
        else {
            return Ok(Flow::Closed);
        };
        let description = if description.is_empty() {
            task.description.clone()
        } else {
            description
        };

        let old = task.priority;
        let Some(raw) = self.prompt(&format!(
            "New priority (high/medium/low) [{}]: ",
            old.as_str()
        ))?
        else {
            return Ok(Flow::Closed);
        };
        let priority = if raw.is_empty() {
            old
        } else if let Some(priority) = Priority::parse(&raw) {
            priority
        } else {
            writeln!(self.output, "Invalid priority. Keeping '{}'.", old.as_str())?;
            old
        };

        self.store.edit(id, &description, priority)?;
        writeln!(self.output, "Task {id} updated.")?;
        Ok(Flow::Continue)
    }

    fn delete_task(&mut self) -> Result<Flow> {
        self.view_tasks()?;
        let Some(id) = self.prompt_id("Enter task ID to delete: ")? else {
            return Ok(Flow::Closed);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        match self.store.delete(id) {
            Ok(()) => writeln!(self.output, "Task {id} deleted.")?,
            Err(StoreError::NotFound(_)) => writeln!(self.output, "Task not found.")?,
            Err(err) => return Err(err.into()),
        }
        Ok(Flow::Continue)
    }

    /// `None` when input is closed; `Some(None)` after reporting an unparseable id.
    fn prompt_id(&mut self, label: &str) -> Result<Option<Option<i64>>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            Ok(id) => Ok(Some(Some(id))),
            Err(_) => {
                writeln!(self.output, "Invalid ID.")?;
                Ok(Some(None))
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
