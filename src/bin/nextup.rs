use anyhow::Result;
use nextup::access::AccessGate;
use nextup::cli::{self, Command, Invocation};
use nextup::config::Config;
use nextup::context::{SharedContext, StandardContext};
use nextup::entry::adapt;
use nextup::model::{AuthorizationState, NewItem};
use nextup::model::display::{ItemDisplay, format_relative};
use nextup::pipeline::{AggregationPipeline, NEXT_REMINDER_HOURS};
use nextup::storage::LocalStorage;
use nextup::store::{FileStore, ReminderStore};
use nextup::timeline::{TimelineProvider, spawn_timeline};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, SimpleLogger, TermLogger, TerminalMode};
use std::env;
use std::sync::Arc;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        env::var("NEXTUP_LOG")
            .ok()
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn)
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("nextup")
        .build();

    // Stdout carries command output, so logs go to stderr.
    if TermLogger::init(level, config.clone(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        let _ = SimpleLogger::init(level, config);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Invocation {
        root,
        verbose,
        command,
    } = match cli::parse_args(&args) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_help("nextup");
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        cli::print_help("nextup");
        return Ok(());
    }

    init_logging(verbose);

    let ctx: SharedContext = Arc::new(StandardContext::new(root));
    let config = Config::load_or_default(ctx.as_ref())?;
    let store = Arc::new(FileStore::new(LocalStorage::get_store_path(ctx.as_ref())?));
    log::debug!(
        "Config at {}, store at {:?}",
        Config::get_path_string(ctx.as_ref())?,
        store.path()
    );

    let gate = Arc::new(
        AccessGate::new(store.clone(), config.interactive).with_timeout(config.fetch_timeout()),
    );
    let pipeline = AggregationPipeline::new(gate.clone()).with_timeout(config.fetch_timeout());
    let now = pipeline.now();

    match command {
        Command::Upcoming { hours, list } => {
            let hours = hours.unwrap_or(config.upcoming_hours);
            let list = list.as_deref().or(config.selected_list.as_deref());
            let items = pipeline.build_upcoming(hours, list).await;
            println!("Due in the next {}h:", hours);
            println!("{}", cli::render_items(&items, now, config.show_url));
        }
        Command::Overview { sample } => {
            let lists = pipeline
                .build_overview(sample.unwrap_or(config.sample_size))
                .await;
            println!("{}", cli::render_overview(&lists, now, config.show_url));
        }
        Command::List { id } => match pipeline.build_list_detail(&id).await {
            Some(detail) => println!(
                "{}",
                cli::render_overview(std::slice::from_ref(&detail), now, config.show_url)
            ),
            None => println!("No readable list with identifier '{}'", id),
        },
        Command::Next { list } => {
            let list = list.as_deref().or(config.selected_list.as_deref());
            match pipeline.next_reminder(list).await {
                Some(item) => {
                    println!("{} ({})", item.title, item.format_due(now));
                    if let Some(url) = item.url_preview() {
                        println!("  {}", url);
                    }
                }
                None => println!(
                    "Nothing due (looked {}h ahead, then further)",
                    NEXT_REMINDER_HOURS
                ),
            }
        }
        Command::Events { hours } => {
            let events = pipeline
                .build_events(hours.unwrap_or(config.upcoming_hours))
                .await;
            println!("{}", cli::render_events(&events));
        }
        Command::Lists => {
            let lists = pipeline.list_options().await;
            println!("{}", cli::render_lists(&lists));
        }
        Command::Tags => {
            for tag in pipeline.collect_tags().await {
                println!("#{}", tag);
            }
        }
        Command::Entry { mode, json } => {
            let mode = mode.unwrap_or(config.view_mode);
            let result = pipeline.aggregate(&config).await;
            let entry = adapt(result, &config.widget(), mode, now);
            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!("{}", cli::render_entry(&entry));
            }
        }
        Command::Add {
            title,
            due,
            list,
            notes,
        } => {
            let item = NewItem {
                title,
                due,
                notes,
                list_id: list,
            };
            match pipeline.create_item(item).await {
                Ok(uid) => println!("Created {}", uid),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Grant => {
            let status = match gate.ensure_access().await {
                Ok(status) => status,
                Err(e) => {
                    eprintln!("Access: {}", e);
                    std::process::exit(1);
                }
            };
            let hint = if status == AuthorizationState::NotDetermined {
                " (set interactive = true to be asked)"
            } else {
                ""
            };
            println!("Access: {:?}{}", status, hint);
        }
        Command::Watch => {
            let provider = Arc::new(TimelineProvider::new(pipeline));
            let mut handle = spawn_timeline(provider, config.clone());
            loop {
                tokio::select! {
                    timeline = handle.entries.recv() => {
                        let Some(timeline) = timeline else { break };
                        println!("{}", cli::render_entry(&timeline.entry));
                        println!(
                            "-- next refresh {}",
                            format_relative(timeline.next_refresh, timeline.entry.date)
                        );
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Help => cli::print_help("nextup"),
    }

    Ok(())
}
