use std::io::{self, Write};

use crate::models::{CLIConfig, TaskInfo, TrendingResponse};

pub fn banner(cfg: &CLIConfig) {
    println!("Lyric Canvas Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Type /help for commands, or enter `artist - title` to search.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                      Show commands");
    println!("  /exit | /quit              Exit");
    println!("  /search <artist> - <title> Submit a song and follow it");
    println!("  /status <task_id>          Show one task");
    println!("  /tasks [limit]             List recent tasks");
    println!("  /trending                  Popular songs for a random artist");
    println!("  /debug [on|off]            Toggle full task output");
    println!("  /config                    Show current config");
    println!("  /base <url>                Update base URL");
}

pub fn progress(task: &TaskInfo) {
    println!("[{:>3}%] {:<10} {}", task.progress, task.status, task.step);
}

pub fn task(task: &TaskInfo, debug: bool) {
    println!("task {} ({} - {})", task.id, task.artist, task.title);
    println!("  status: {} ({}%)", task.status, task.progress);
    println!("  created: {}", task.created_at);
    if let Some(done) = &task.completed_at {
        println!("  completed: {}", done);
    }
    if let Some(secs) = task.processing_time_secs {
        println!("  took: {:.1}s", secs);
    }
    if let Some(mood) = &task.mood {
        println!("  mood: {}", mood);
    }
    if let Some(themes) = &task.themes {
        println!("  themes: {}", themes.join(", "));
    }
    if let Some(local) = &task.local_image {
        println!("  image: {}", local);
    }
    if let Some(err) = &task.error {
        println!("  error: {}", err);
    }
    if debug {
        if let Some(preview) = &task.lyrics_preview {
            println!("  lyrics: {}", preview.replace('\n', " / "));
        }
        if let Some(analysis) = &task.analysis {
            println!("  analysis: {}", analysis);
        }
        if let Some(prompt) = &task.generated_prompt {
            println!("  prompt: {}", prompt);
        }
        if let Some(url) = &task.image_url {
            println!("  remote image: {}", url);
        }
    }
}

pub fn tasks(tasks: &[TaskInfo]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in tasks {
        println!(
            "[{}] {} - {} - {} ({}%)",
            task.status, task.id, task.artist, task.title, task.progress
        );
    }
}

pub fn trending(resp: &TrendingResponse) {
    println!("trending for {}:", resp.artist);
    if resp.songs.is_empty() {
        println!("  no songs");
    }
    for song in &resp.songs {
        println!("  {} - {}  {}", song.artist, song.title, song.url);
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  poll: {}ms x {}", cfg.poll_interval_ms, cfg.poll_limit);
    println!("  debug: {}", cfg.debug);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
