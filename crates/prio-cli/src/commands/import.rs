use std::path::PathBuf;

use anyhow::Context;
use prio_core::entities::Task;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::commands::shared::tasks::read_tasks_file;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub projects: Vec<String>,
    pub data_dir: PathBuf,
}

pub fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut tasks = read_tasks_file(&args.file)?;
    if let Some(project) = &args.project {
        reassign(&mut tasks, project);
    }

    let imported = ctx
        .store
        .import_tasks(&tasks)
        .context("failed to write imported tasks")?;

    let mut projects: Vec<String> = tasks.iter().map(|t| t.project_id.clone()).collect();
    projects.sort();
    projects.dedup();

    output(
        &ImportResponse {
            imported,
            projects,
            data_dir: ctx.store.root().to_path_buf(),
        },
        flags.format,
    )
}

fn reassign(tasks: &mut [Task], project: &str) {
    for task in tasks {
        task.project_id = project.to_string();
    }
}

#[cfg(test)]
mod tests {
    use prio_core::lookup::Repository;

    use super::*;

    #[test]
    fn reassigned_tasks_land_in_one_project() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = AppContext::init(prio_config::PrioConfig::default(), Some(dir.path()))
            .expect("init");
        let mut tasks = vec![Task::new("a", "x", "A"), Task::new("b", "y", "B")];
        reassign(&mut tasks, "web");
        ctx.store.import_tasks(&tasks).expect("import");

        let stored = ctx.store.fetch_tasks("web").expect("fetch");
        assert_eq!(stored.len(), 2);
        assert!(ctx.store.fetch_tasks("x").expect("fetch").is_empty());
    }
}
