//! Moodtrack CLI
//!
//! Command-line client for a running Moodtrack server:
//! - Log, edit and delete mood entries
//! - Show the week, a month calendar and trends
//! - Statistics and tag correlation
//! - Export data

use anyhow::{bail, Context};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use moodtrack::api::dto::{
    ClearResponse, EntryListResponse, HealthResponse, StatsResponse, SuggestResponse,
    TagStatsResponse, TrendResponse, WeekResponse,
};
use moodtrack::engine::MonthGrid;
use moodtrack::model::{MoodEntry, MoodLevel, YearMonth};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moodtrack-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily mood journal")]
#[command(long_about = "Moodtrack keeps one mood per day.\nLog how you feel, look back over weeks and months, and see which activities go with good days.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// User whose entries are read and written
    #[arg(short, long, env = "MOODTRACK_USER", default_value = "me", global = true)]
    pub user: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log today's mood (1 = very bad .. 5 = excellent)
    Log {
        mood: u8,
        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
        /// Tags (Work, Sleep, Exercise, Food, Social, Weather, Health, Stress, Family, Hobbies, Travel, Money)
        #[arg(short = 'T', long)]
        tags: Vec<String>,
    },

    /// List entries, newest first
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one entry by id or by date (yyyy-MM-dd)
    Show { id_or_date: String },

    /// Change an entry
    Edit {
        id: String,
        #[arg(short, long)]
        mood: Option<u8>,
        #[arg(short, long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
        /// Replace the tags
        #[arg(short = 'T', long)]
        tags: Option<Vec<String>>,
    },

    /// Delete an entry
    Delete { id: String },

    /// Delete every entry of the user
    Clear {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Monday-start week containing a date
    Week {
        /// Reference date (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Month calendar
    Calendar {
        /// yyyy-MM (default: this month)
        month: Option<String>,
    },

    /// Daily mood over the last N days
    Trend {
        #[arg(short, long, default_value = "30")]
        days: usize,
        /// Last day of the window (default: today)
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Overall statistics
    Stats,

    /// Average mood per tag
    Tags,

    /// Ask the server for a mood suggestion
    Suggest,

    /// Export all entries
    Export {
        /// json, csv or ndjson
        #[arg(long, default_value = "json")]
        export_format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Thin client for the `/api/v1` routes
struct ApiClient {
    http: reqwest::Client,
    base: String,
    user: String,
}

impl ApiClient {
    fn new(api_url: &str, user: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: api_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/api/v1{}", self.base, path))
            .header("X-User-Id", &self.user)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        decode(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<T> {
        let response = self.request(method, path).json(body).send().await?;
        decode(response).await
    }
}

/// Decode a success body or turn the error envelope into a message
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let response = check(response).await?;
    Ok(response.json().await?)
}

async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);
    bail!("Request failed ({}): {}", status, message)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url, &cli.user);
    let json = cli.format == "json";

    match cli.command {
        Commands::Log { mood, note, tags } => {
            let body = serde_json::json!({ "mood": mood, "note": note, "tags": tags });
            let entry: MoodEntry = client
                .send_json(reqwest::Method::POST, "/entries", &body)
                .await?;

            if json {
                print_json(&entry)?;
            } else {
                println!(
                    "Logged {} {} for {} ({})",
                    mood_emoji(entry.mood),
                    MoodLevel::label_for(entry.mood),
                    entry.date,
                    entry.id
                );
            }
        }

        Commands::List { limit } => {
            let list: EntryListResponse = client.get(&format!("/entries?limit={}", limit)).await?;

            if json {
                print_json(&list)?;
            } else if list.entries.is_empty() {
                println!("No entries yet.");
                println!();
                println!("Log your first mood with:");
                println!("  moodtrack-cli log 4 --note \"good day\"");
            } else {
                print_entries(&list.entries);
                if list.total > list.entries.len() {
                    println!();
                    println!("({} of {} entries)", list.entries.len(), list.total);
                }
            }
        }

        Commands::Show { id_or_date } => {
            let path = if is_date(&id_or_date) {
                format!("/entries/date/{}", id_or_date)
            } else {
                format!("/entries/{}", id_or_date)
            };
            let entry: MoodEntry = client.get(&path).await?;

            if json {
                print_json(&entry)?;
            } else {
                print_entry_detail(&entry);
            }
        }

        Commands::Edit {
            id,
            mood,
            note,
            clear_note,
            tags,
        } => {
            let mut body = serde_json::Map::new();
            if let Some(mood) = mood {
                body.insert("mood".to_string(), mood.into());
            }
            if clear_note {
                body.insert("note".to_string(), serde_json::Value::Null);
            } else if let Some(note) = note {
                body.insert("note".to_string(), note.into());
            }
            if let Some(tags) = tags {
                body.insert("tags".to_string(), tags.into());
            }
            if body.is_empty() {
                bail!("Nothing to change. Pass --mood, --note, --clear-note or --tags");
            }

            let entry: MoodEntry = client
                .send_json(
                    reqwest::Method::PUT,
                    &format!("/entries/{}", id),
                    &serde_json::Value::Object(body),
                )
                .await?;

            if json {
                print_json(&entry)?;
            } else {
                println!("Updated {}", entry.id);
                print_entry_detail(&entry);
            }
        }

        Commands::Delete { id } => {
            let response = client
                .request(reqwest::Method::DELETE, &format!("/entries/{}", id))
                .send()
                .await?;
            check(response).await?;
            println!("Deleted {}", id);
        }

        Commands::Clear { yes } => {
            if !yes {
                bail!("This deletes every entry of '{}'. Re-run with --yes", cli.user);
            }
            let response = client
                .request(reqwest::Method::DELETE, "/entries")
                .send()
                .await?;
            let cleared: ClearResponse = decode(response).await?;
            println!("Removed {} entries", cleared.removed);
        }

        Commands::Week { date } => {
            let path = match date {
                Some(date) => format!("/week?date={}", date),
                None => "/week".to_string(),
            };
            let week: WeekResponse = client.get(&path).await?;

            if json {
                print_json(&week)?;
            } else {
                println!("Week of {}", week.reference_date);
                println!();
                for day in &week.days {
                    let mood = match day.mood {
                        Some(mood) => format!(
                            "{} {:<10} {}",
                            mood_emoji(mood),
                            MoodLevel::label_for(mood),
                            "#".repeat(mood as usize * 4)
                        ),
                        None if day.has_entry => "?".to_string(),
                        None => "-".to_string(),
                    };
                    println!("{} {}  {}", day.weekday_label, day.date.format("%m-%d"), mood);
                }
            }
        }

        Commands::Calendar { month } => {
            let year_month = match month {
                Some(month) => month
                    .parse::<YearMonth>()
                    .with_context(|| format!("Invalid month '{}'", month))?,
                None => YearMonth::of(Local::now().date_naive()),
            };
            let grid: MonthGrid = client.get(&format!("/calendar/{}", year_month)).await?;

            if json {
                print_json(&grid)?;
            } else {
                print_calendar(&grid);
            }
        }

        Commands::Trend { days, end } => {
            let mut path = format!("/trends?days={}", days);
            if let Some(end) = end {
                path.push_str(&format!("&end={}", end));
            }
            let trend: TrendResponse = client.get(&path).await?;

            if json {
                print_json(&trend)?;
            } else {
                println!("{:<8} {}", "Day", "Mood");
                println!("{}", "-".repeat(32));
                for point in &trend.points {
                    let bar = point
                        .mood
                        .map(|m| format!("{} {}", "#".repeat(m as usize * 4), m))
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<8} {}", point.label, bar);
                }
            }
        }

        Commands::Stats => {
            let stats: StatsResponse = client.get("/stats").await?;

            if json {
                print_json(&stats)?;
            } else {
                match &stats.stats {
                    None => println!("No entries yet."),
                    Some(s) => {
                        println!("Entries:       {}", s.total_entries);
                        println!("Average mood:  {:.1}", s.average_mood);
                        println!(
                            "Most common:   {} {}",
                            mood_emoji(s.most_common_mood),
                            MoodLevel::label_for(s.most_common_mood)
                        );
                        println!("Good days:     {:.0}%", s.good_day_ratio() * 100.0);
                        println!();
                        for mood in (1..=5).rev() {
                            let count = s.count_of(mood);
                            println!(
                                "  {} {:<10} {:>4}  {}",
                                mood_emoji(mood),
                                MoodLevel::label_for(mood),
                                count,
                                "#".repeat(bar_width(count, s.total_entries, 30))
                            );
                        }
                    }
                }
            }
        }

        Commands::Tags => {
            let tags: TagStatsResponse = client.get("/tags").await?;

            if json {
                print_json(&tags)?;
            } else if tags.tags.is_empty() {
                println!("No tagged entries yet.");
            } else {
                println!("{:<10} {:>6} {:>8}", "Tag", "Count", "Average");
                println!("{}", "-".repeat(26));
                for stat in &tags.tags {
                    println!(
                        "{:<10} {:>6} {:>8.1}",
                        stat.tag.as_str(),
                        stat.count,
                        stat.average_mood
                    );
                }
            }
        }

        Commands::Suggest => {
            let response = client.request(reqwest::Method::POST, "/suggest").send().await?;
            let suggestion: SuggestResponse = decode(response).await?;

            if json {
                print_json(&suggestion)?;
            } else {
                println!(
                    "Suggested mood: {} {} ({:.0}% confidence)",
                    suggestion.emoji,
                    suggestion.label,
                    suggestion.confidence * 100.0
                );
                println!();
                println!("Log it with:");
                println!("  moodtrack-cli log {}", suggestion.mood);
            }
        }

        Commands::Export {
            export_format,
            output,
        } => {
            let response = client
                .request(
                    reqwest::Method::GET,
                    &format!("/export?format={}", export_format),
                )
                .send()
                .await?;
            let data = check(response).await?.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    print!("{}", data);
                }
            }
        }

        Commands::Status => {
            let response = client
                .http
                .get(format!("{}/health", client.base))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: HealthResponse = resp.json().await?;
                    if json {
                        print_json(&health)?;
                    } else {
                        println!("Moodtrack v{}", health.version);
                        println!();
                        println!("API Status: {}", health.status);
                        println!("Store:      {}", health.store);
                        if let (Some(entries), Some(users)) = (health.entries, health.users) {
                            println!("  Entries: {}", entries);
                            println!("  Users:   {}", users);
                        }
                        println!("Live connections: {}", health.ws_connections);
                        println!(
                            "Suggestions:      {}",
                            if health.suggest_enabled { "enabled" } else { "disabled" }
                        );
                        println!();
                        println!("Uptime: {}", format_duration(health.uptime_seconds));
                    }
                }
                Ok(resp) => {
                    bail!("API returned error: {}", resp.status());
                }
                Err(e) => {
                    eprintln!("Cannot connect to Moodtrack API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Moodtrack server is running:");
                    eprintln!("  cargo run --bin moodtrack");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = moodtrack::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn is_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn mood_emoji(mood: u8) -> &'static str {
    MoodLevel::of(mood).map(|l| l.emoji).unwrap_or("?")
}

fn bar_width(count: usize, total: usize, width: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (count * width + total / 2) / total
}

fn print_entries(entries: &[MoodEntry]) {
    println!(
        "{:<12} {:<14} {:<28} {}",
        "Date", "Mood", "Tags", "Note"
    );
    println!("{}", "-".repeat(80));

    for entry in entries {
        let tags = entry
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let note = entry.note.as_deref().unwrap_or("");
        println!(
            "{:<12} {} {:<11} {:<28} {}",
            entry.date,
            mood_emoji(entry.mood),
            MoodLevel::label_for(entry.mood),
            truncate(&tags, 28),
            truncate(note, 40)
        );
    }
}

fn print_entry_detail(entry: &MoodEntry) {
    println!("ID:      {}", entry.id);
    println!("Date:    {}", entry.date);
    println!(
        "Mood:    {} {} ({})",
        mood_emoji(entry.mood),
        MoodLevel::label_for(entry.mood),
        entry.mood
    );
    println!(
        "Logged:  {}",
        entry
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
    if let Some(updated) = entry.updated_at {
        println!(
            "Edited:  {}",
            updated.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(|t| t.as_str()).collect();
        println!("Tags:    {}", tags.join(", "));
    }
    if let Some(note) = &entry.note {
        println!("Note:    {}", note);
    }
}

fn print_calendar(grid: &MonthGrid) {
    let first = grid.year_month.first_day();
    println!("{:^35}", first.format("%B %Y").to_string());
    println!(
        "{}",
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .map(|d| format!("{:>5}", d))
            .join("")
    );

    for week in grid.cells.chunks(7) {
        let mut line = String::new();
        for cell in week {
            if !cell.in_target_month {
                line.push_str(&format!("{:>5}", ""));
                continue;
            }
            let marker = match cell.entry.as_ref().and_then(|e| e.valid_mood()) {
                Some(mood) => char::from(b'0' + mood),
                None => '.',
            };
            let today = if cell.is_today { '*' } else { ' ' };
            line.push_str(&format!("{:>3}{}{}", cell.date.day(), marker, today));
        }
        println!("{}", line);
    }

    println!();
    println!(
        "Days logged: {}  Average: {:.1}  Good days: {}",
        grid.summary.days_logged, grid.summary.average_mood, grid.summary.good_days
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
