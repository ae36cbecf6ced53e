//! `watch` and `serve`: dev server, reload socket and rebuild on change.
//!
//! ```text
//! FileWatcher ──Trigger──► queue ──► Run(tasks)  → Runner (one run at a time)
//!                                └─► Reload(kind) → ReloadServer::broadcast
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;

use super::run::{format_elapsed, run_tasks};
use super::serve::DevServer;
use crate::config::SiteConfig;
use crate::reload::ReloadServer;
use crate::site;
use crate::task::{RunError, Runner, TaskGraph};
use crate::watch::{FileWatcher, ReloadKind, Trigger, WatchAction, WatchBinding};
use crate::{core, debug, log, logger};

/// Run `prerequisites`, then serve and watch until Ctrl+C.
pub async fn watch(config: Arc<SiteConfig>, prerequisites: &[&str]) -> Result<()> {
    let graph = Arc::new(site::task_graph()?);
    let bindings = bindings(&config, &graph)?;
    let runner = Runner::new(graph, Arc::clone(&config));

    if !prerequisites.is_empty() {
        run_tasks(Arc::clone(&config), prerequisites).await?;
    }

    let mut reload = ReloadServer::start(config.serve.interface, config.serve.reload_port)?;
    let server = DevServer::bind(&config, Some(reload.port()))?;
    log!("serve"; "http://{}", server.addr());
    debug!("reload"; "ws://{}:{}", config.serve.interface, reload.port());
    core::register_server(server.handle());
    let http = std::thread::Builder::new()
        .name("sitekit-http".into())
        .spawn(move || server.run())?;

    let mut watcher = FileWatcher::new(config.root());
    for binding in bindings {
        watcher.bind(binding);
    }
    let (tx, mut triggers) = mpsc::unbounded_channel();
    let handle = watcher.start(tx)?;
    log!("watch"; "watching for changes, press Ctrl+C to stop");

    let shutdown = core::wait_for_shutdown(core::shutdown_receiver());
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            trigger = triggers.recv() => match trigger {
                Some(trigger) => dispatch(&runner, &reload, trigger).await,
                None => break,
            },
        }
    }

    handle.shutdown().await;
    reload.close();
    match http.join() {
        Ok(result) => result.context("dev server failed"),
        Err(_) => bail!("dev server thread panicked"),
    }
}

async fn dispatch(runner: &Runner<SiteConfig>, reload: &ReloadServer, trigger: Trigger) {
    match trigger.action {
        WatchAction::Run(tasks) => {
            let targets: Vec<&str> = tasks.iter().map(String::as_str).collect();
            let start = Instant::now();
            match runner.run(&targets).await {
                Ok(_) => logger::status_success(&format!(
                    "{} ({}) in {}",
                    tasks.join(", "),
                    describe_paths(&trigger.paths),
                    format_elapsed(start.elapsed())
                )),
                Err(RunError::Failed { failures, .. }) => {
                    let detail = failures
                        .iter()
                        .map(|f| format!("{:#}", f.error))
                        .collect::<Vec<_>>()
                        .join("\n");
                    let names: Vec<&str> = failures.iter().map(|f| f.task.as_str()).collect();
                    logger::status_error(&format!("{} failed", names.join(", ")), &detail);
                }
                Err(e) => logger::status_error(&format!("{} failed", tasks.join(", ")), &e.to_string()),
            }
        }
        WatchAction::Reload(kind) => {
            let reached = reload.broadcast(kind.into());
            debug!("reload"; "{:?} → {} client(s)", kind, reached);
        }
    }
}

/// Watch bindings from `[watch]`: task rules, then page and stylesheet reloads.
fn bindings(config: &SiteConfig, graph: &TaskGraph<SiteConfig>) -> Result<Vec<WatchBinding>> {
    let window = Duration::from_millis(config.watch.debounce_ms);
    let mut out = Vec::new();

    for rule in config.watch.task_rules(&config.paths) {
        if let Some(unknown) = rule.run.iter().find(|t| !graph.contains(t)) {
            bail!("watch rule for {:?} runs unknown task `{}`", rule.patterns, unknown);
        }
        if rule.patterns.is_empty() {
            continue;
        }
        out.push(WatchBinding::new(
            rule.run.join("+"),
            &rule.patterns,
            WatchAction::Run(rule.run.clone()),
            window,
            config.watch.debounce,
        )?);
    }

    let reloads = [
        ("reload", config.watch.reload_patterns(&config.paths, &config.build), ReloadKind::Full),
        ("reload-css", config.watch.reload_css_patterns(&config.build), ReloadKind::Css),
    ];
    for (name, patterns, kind) in reloads {
        if patterns.is_empty() {
            continue;
        }
        out.push(WatchBinding::new(
            name,
            &patterns,
            WatchAction::Reload(kind),
            window,
            config.watch.reload_debounce,
        )?);
    }
    Ok(out)
}

fn describe_paths(paths: &[String]) -> String {
    match paths {
        [] => "changed".to_string(),
        [one] => one.clone(),
        [first, rest @ ..] => format!("{first} +{}", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WatchRule, test_parse_config};

    #[test]
    fn test_default_bindings() {
        let config = test_parse_config("");
        let graph = site::task_graph().unwrap();
        let bindings = bindings(&config, &graph).unwrap();

        let names: Vec<&str> = bindings.iter().map(WatchBinding::name).collect();
        assert_eq!(
            names,
            ["styles+modernizr", "scripts", "vendor", "html", "icons", "fonts", "reload", "reload-css"]
        );
        assert_eq!(bindings[6].action(), &WatchAction::Reload(ReloadKind::Full));
        assert_eq!(bindings[7].action(), &WatchAction::Reload(ReloadKind::Css));
    }

    #[test]
    fn test_steady_changes_reload_once() {
        let config = test_parse_config("");
        let graph = site::task_graph().unwrap();
        let mut bindings = bindings(&config, &graph).unwrap();
        let reload = bindings.iter_mut().find(|b| b.name() == "reload").unwrap();

        let t0 = Instant::now();
        let mut fired = Vec::new();
        for ms in (0..=2000).step_by(10) {
            let now = t0 + Duration::from_millis(ms);
            if ms % 400 == 0 && ms <= 800 {
                reload.observe(".tmp/index.html", now);
            }
            if reload.poll(now).is_some() {
                fired.push(ms);
            }
        }
        assert_eq!(fired, vec![1300]);
    }

    #[test]
    fn test_rule_with_unknown_task_is_rejected() {
        let mut config = test_parse_config("");
        config.watch.rules = Some(vec![WatchRule {
            patterns: vec!["app/**/*.md".into()],
            run: vec!["docs".into()],
        }]);
        let graph = site::task_graph().unwrap();
        let err = bindings(&config, &graph).unwrap_err();
        assert!(err.to_string().contains("unknown task `docs`"));
    }

    #[test]
    fn test_describe_paths() {
        assert_eq!(describe_paths(&["a.scss".into()]), "a.scss");
        assert_eq!(describe_paths(&["a.scss".into(), "b.scss".into(), "c.scss".into()]), "a.scss +2");
    }
}
