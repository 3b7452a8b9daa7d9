//! Runs pipeline stages in order, stopping at the first failure.

use anyhow::Result;
use colored::Colorize;

type StageFn<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

struct Stage<'a> {
    name: &'static str,
    action: StageFn<'a>,
}

/// Ordered list of stages. A stage only starts once every earlier stage
/// returned `Ok`.
#[derive(Default)]
pub struct Sequencer<'a> {
    stages: Vec<Stage<'a>>,
}

impl<'a> Sequencer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<F>(mut self, name: &'static str, action: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'a,
    {
        self.stages.push(Stage {
            name,
            action: Box::new(action),
        });
        self
    }

    /// Run every stage. The first failure aborts the rest and is returned.
    pub fn run(self) -> Result<()> {
        let total = self.stages.len();
        let names: Vec<&'static str> = self.stages.iter().map(|s| s.name).collect();

        for (index, stage) in self.stages.into_iter().enumerate() {
            println!();
            println!(
                "{}",
                format!("═══ [{}/{}] {} ═══", index + 1, total, stage.name)
                    .cyan()
                    .bold()
            );

            if let Err(e) = (stage.action)() {
                println!("{} Stage '{}' failed: {:#}", "✗".red(), stage.name, e);
                let skipped = &names[index + 1..];
                if !skipped.is_empty() {
                    println!(
                        "{} Aborting; not running: {}",
                        "Note:".yellow().bold(),
                        skipped.join(", ")
                    );
                }
                return Err(e.context(format!("Stage '{}' failed", stage.name)));
            }

            println!("{} Stage '{}' finished", "✓".green(), stage.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_all_stages_run_in_order() {
        let ran = RefCell::new(Vec::new());

        Sequencer::new()
            .stage("extract", || {
                ran.borrow_mut().push("extract");
                Ok(())
            })
            .stage("index", || {
                ran.borrow_mut().push("index");
                Ok(())
            })
            .stage("serve", || {
                ran.borrow_mut().push("serve");
                Ok(())
            })
            .run()
            .unwrap();

        assert_eq!(*ran.borrow(), vec!["extract", "index", "serve"]);
    }

    #[test]
    fn test_first_failure_aborts_the_rest() {
        let ran = RefCell::new(Vec::new());

        let err = Sequencer::new()
            .stage("extract", || {
                ran.borrow_mut().push("extract");
                anyhow::bail!("missing credential")
            })
            .stage("index", || {
                ran.borrow_mut().push("index");
                Ok(())
            })
            .stage("serve", || {
                ran.borrow_mut().push("serve");
                Ok(())
            })
            .run()
            .unwrap_err();

        assert_eq!(*ran.borrow(), vec!["extract"]);
        assert_eq!(err.to_string(), "Stage 'extract' failed");
        assert!(format!("{:#}", err).contains("missing credential"));
    }

    #[test]
    fn test_middle_failure_keeps_earlier_work() {
        let ran = RefCell::new(Vec::new());

        let result = Sequencer::new()
            .stage("extract", || {
                ran.borrow_mut().push("extract");
                Ok(())
            })
            .stage("index", || anyhow::bail!("store unavailable"))
            .stage("serve", || {
                ran.borrow_mut().push("serve");
                Ok(())
            })
            .run();

        assert!(result.is_err());
        assert_eq!(*ran.borrow(), vec!["extract"]);
    }
}
