use std::io;
use std::thread;
use std::time::Duration;

use crate::client::HTTPClient;
use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.search(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "search" => self.search(rest),
            "status" => {
                if rest.is_empty() {
                    render::error("usage: /status <task_id>");
                } else {
                    match self.client.status(rest) {
                        Ok(task) => render::task(&task, self.config.debug),
                        Err(err) => render::error(&err),
                    }
                }
            }
            "tasks" => {
                let limit = rest.parse::<usize>().unwrap_or(10);
                match self.client.list_tasks(limit) {
                    Ok(tasks) => render::tasks(&tasks),
                    Err(err) => render::error(&err),
                }
            }
            "trending" => match self.client.trending() {
                Ok(resp) => render::trending(&resp),
                Err(err) => render::error(&err),
            },
            "debug" => {
                if rest.is_empty() {
                    self.config.debug = !self.config.debug;
                    render::info(&format!("debug: {}", self.config.debug));
                } else if let Some(flag) = parse_on_off(rest) {
                    self.config.debug = flag;
                    render::info(&format!("debug: {}", self.config.debug));
                } else {
                    render::error("invalid debug flag");
                }
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    match HTTPClient::new(rest) {
                        Ok(client) => {
                            self.config.base_url = rest.to_string();
                            self.client = client;
                            render::info("base url updated");
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn search(&self, input: &str) {
        let Some((artist, title)) = split_song(input) else {
            render::error("expected `artist - title`");
            return;
        };
        let resp = match self.client.submit(artist, title) {
            Ok(resp) => resp,
            Err(err) => return render::error(&err),
        };
        let task_id = match (resp.success, resp.task_id) {
            (true, Some(id)) => id,
            _ => return render::error(&resp.error.unwrap_or_else(|| "search rejected".to_string())),
        };
        render::info(&format!("task {} accepted", task_id));
        self.follow(&task_id);
    }

    /// Polls a task, printing each progress change, until it finishes or the poll limit runs out.
    fn follow(&self, task_id: &str) {
        let mut last_progress = None;
        for _ in 0..self.config.poll_limit {
            match self.client.status(task_id) {
                Ok(task) => {
                    if last_progress != Some((task.status.clone(), task.progress)) {
                        render::progress(&task);
                        last_progress = Some((task.status.clone(), task.progress));
                    }
                    if task.is_terminal() {
                        render::task(&task, self.config.debug);
                        return;
                    }
                }
                Err(err) => {
                    render::error(&err);
                    return;
                }
            }
            thread::sleep(Duration::from_millis(self.config.poll_interval_ms));
        }
        render::info(&format!("still running, check later with /status {}", task_id));
    }
}

fn split_song(input: &str) -> Option<(&str, &str)> {
    let (artist, title) = input.split_once(" - ")?;
    let (artist, title) = (artist.trim(), title.trim());
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist, title))
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
