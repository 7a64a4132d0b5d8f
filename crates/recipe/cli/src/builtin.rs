//! Modules that ship with the runner

use async_trait::async_trait;
use recipe_engine::{Module, ModuleContext, ModuleRegistry};
use recipe_types::{ModuleArgs, ModuleResult, Report};

/// Registry holding the built-in modules
pub fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .with("ReportEmitter", ReportEmitter::new)
        .with("ReportPrinter", ReportPrinter::new)
}

/// Publishes a report whose text comes from the `text` argument
pub struct ReportEmitter {
    ctx: ModuleContext,
    text: Option<String>,
}

impl ReportEmitter {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx, text: None }
    }
}

#[async_trait]
impl Module for ReportEmitter {
    async fn setup(&mut self, args: &ModuleArgs) -> ModuleResult<()> {
        self.text = Some(args.require_str("text")?.to_string());
        Ok(())
    }

    async fn process(&mut self) -> ModuleResult<()> {
        let text = self.text.clone().unwrap_or_default();
        self.ctx
            .store_container(Report::new(self.ctx.module_name(), text));
        Ok(())
    }
}

/// Prints every report stored so far
pub struct ReportPrinter {
    ctx: ModuleContext,
}

impl ReportPrinter {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx }
    }

    fn render(reports: &[std::sync::Arc<Report>]) -> String {
        reports
            .iter()
            .map(|r| format!("== {} ==\n{}\n", r.module_name, r.text))
            .collect()
    }
}

#[async_trait]
impl Module for ReportPrinter {
    async fn process(&mut self) -> ModuleResult<()> {
        let reports = self.ctx.get_containers::<Report>();
        if reports.is_empty() {
            self.ctx.add_error("No reports to print", false);
            return Ok(());
        }
        print!("{}", Self::render(&reports));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_engine::RunState;
    use std::sync::Arc;

    #[test]
    fn test_registry_names() {
        assert_eq!(registry().names(), vec!["ReportEmitter", "ReportPrinter"]);
    }

    #[tokio::test]
    async fn test_emitter_requires_text() {
        let ctx = ModuleContext::new("ReportEmitter", Arc::new(RunState::new()));
        let mut emitter = ReportEmitter::new(ctx);
        assert!(emitter.setup(&ModuleArgs::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_emitter_stores_report() {
        let state = Arc::new(RunState::new());
        let mut emitter = ReportEmitter::new(ModuleContext::new("Greeter", Arc::clone(&state)));
        emitter
            .setup(&ModuleArgs::new().with("text", "hi"))
            .await
            .unwrap();
        emitter.process().await.unwrap();

        let reports = state.store().get::<Report>();
        assert_eq!(reports[0].module_name, "Greeter");
        assert_eq!(reports[0].text, "hi");
    }

    #[tokio::test]
    async fn test_printer_warns_when_empty() {
        let ctx = ModuleContext::new("ReportPrinter", Arc::new(RunState::new()));
        let mut printer = ReportPrinter::new(ctx.clone());
        printer.process().await.unwrap();

        let errors = ctx.errors();
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].critical);
    }

    #[test]
    fn test_render() {
        let reports = vec![Arc::new(Report::new("A", "one")), Arc::new(Report::new("B", "two"))];
        assert_eq!(
            ReportPrinter::render(&reports),
            "== A ==\none\n== B ==\ntwo\n"
        );
    }
}
