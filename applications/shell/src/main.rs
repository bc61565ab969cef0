/// Encore - headless player session shell
use anyhow::Context;
use clap::{Parser, Subcommand};
use encore_core::{PlaylistId, Track, TrackId, UserContext};
use encore_playback::{PlayerSession, PlaylistLibrary, SimulatedHandle};
use encore_shell::{Command, Flow, Shell, ShellConfig};
use encore_storage::SqliteStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "encore_shell=info,encore_playback=info,encore_storage=info";

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Encore playback session shell", long_about = None)]
struct Cli {
    /// Configuration file path (default: encore.toml)
    #[arg(short, long, global = true, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Act as this user instead of session.user_id
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Log level for Encore crates (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive player
    Play {
        /// Playlist to start with
        playlist_id: Option<String>,
    },
    /// Apply database migrations
    Migrate,
    /// Print the effective configuration
    Config,
    /// List playlists visible to the user
    Playlists,
    /// Create a playlist
    CreatePlaylist {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Make the playlist visible to everyone
        #[arg(long)]
        public: bool,
    },
    /// Rename a playlist
    Rename { playlist_id: String, name: String },
    /// Delete a playlist you own
    Delete { playlist_id: String },
    /// Append a track to a playlist
    AddTrack {
        playlist_id: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        /// Audio source URL
        #[arg(long)]
        url: String,
        /// Duration in seconds
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Remove every occurrence of a track from a playlist
    RemoveTrack {
        playlist_id: String,
        track_id: String,
    },
    /// Move a track within a playlist (1-based positions)
    MoveTrack {
        playlist_id: String,
        from: usize,
        to: usize,
    },
    /// Add someone else's playlist to your library
    Save { playlist_id: String },
    /// Remove a playlist from your library
    Unsave { playlist_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = ShellConfig::load(cli.config.as_deref())?;
    if let Some(user) = cli.user {
        config.session.user_id = Some(user);
    }
    config.validate()?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Migrate => {
            open_store(&config).await?;
            println!("Database is up to date");
        }
        Commands::Play { playlist_id } => {
            play(&config, playlist_id.map(PlaylistId::new)).await?;
        }
        command => {
            let store = Arc::new(open_store(&config).await?);
            let mut library = PlaylistLibrary::new(store, config.user());
            library.refresh_playlists().await?;
            manage(&mut library, command).await?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(format!(
            "encore_shell={level},encore_playback={level},encore_storage={level}"
        )),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };

    // stdout belongs to the shell
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn open_store(config: &ShellConfig) -> anyhow::Result<SqliteStore> {
    let url = &config.storage.database_url;
    if let Some(dir) = database_dir(url) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }

    let pool = encore_storage::create_pool(url).await?;
    encore_storage::run_migrations(&pool).await?;
    tracing::info!(database_url = %url, "database ready");

    Ok(SqliteStore::new(pool))
}

/// Parent directory of a file-backed sqlite url
fn database_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}

async fn manage(
    library: &mut PlaylistLibrary<SqliteStore>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Playlists => {
            if library.playlists().is_empty() {
                println!("No playlists");
            }
            for playlist in library.playlists() {
                println!(
                    "{}  {:<24} {:>3} tracks  {}",
                    playlist.id,
                    playlist.name,
                    playlist.tracks.len(),
                    playlist.visibility.as_str()
                );
            }
        }
        Commands::CreatePlaylist {
            name,
            description,
            public,
        } => {
            let id = library
                .create_playlist(&name, &description, Vec::new(), public)
                .await?;
            println!("{}", id);
        }
        Commands::Rename { playlist_id, name } => {
            library
                .rename_playlist(&PlaylistId::new(playlist_id), &name)
                .await?;
        }
        Commands::Delete { playlist_id } => {
            library.delete_playlist(&PlaylistId::new(playlist_id)).await?;
        }
        Commands::AddTrack {
            playlist_id,
            id,
            title,
            artist,
            url,
            duration,
        } => {
            let mut track = Track::new(TrackId::new(id), title, artist, url);
            if let Some(secs) = duration {
                track = track.with_duration_secs(secs);
            }
            library
                .add_track_to_playlist(&PlaylistId::new(playlist_id), track)
                .await?;
        }
        Commands::RemoveTrack {
            playlist_id,
            track_id,
        } => {
            library
                .remove_track_from_playlist(&PlaylistId::new(playlist_id), &TrackId::new(track_id))
                .await?;
        }
        Commands::MoveTrack {
            playlist_id,
            from,
            to,
        } => {
            let (Some(from), Some(to)) = (from.checked_sub(1), to.checked_sub(1)) else {
                anyhow::bail!("positions start at 1");
            };
            library
                .move_track(&PlaylistId::new(playlist_id), from, to)
                .await?;
        }
        Commands::Save { playlist_id } => {
            library.save_playlist(&PlaylistId::new(playlist_id)).await?;
        }
        Commands::Unsave { playlist_id } => {
            library.unsave_playlist(&PlaylistId::new(playlist_id)).await?;
        }
        Commands::Play { .. } | Commands::Migrate | Commands::Config => {}
    }

    Ok(())
}

async fn play(config: &ShellConfig, playlist_id: Option<PlaylistId>) -> anyhow::Result<()> {
    let store = Arc::new(open_store(config).await?);
    let user = config.user();
    if user == UserContext::Anonymous {
        tracing::info!("running anonymously, library edits are disabled");
    }

    let mut library = PlaylistLibrary::new(store, user);
    library.refresh_playlists().await?;
    let session = PlayerSession::new(SimulatedHandle::default(), &config.player);
    let mut shell = Shell::new(session, library);

    let mut out = std::io::stdout();
    writeln!(out, "Encore - type `help` for commands")?;

    if let Some(playlist_id) = playlist_id {
        let command = Command::PlayPlaylist {
            playlist_id,
            start: 0,
        };
        if let Err(err) = shell.execute(command, &mut out).await {
            writeln!(out, "error: {}", err)?;
        }
        shell.write_events(&mut out)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let tick = config.tick();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let flow = match line.parse::<Command>() {
                    Ok(command) => shell.execute(command, &mut out).await,
                    Err(err) => Err(err),
                };
                match flow {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => writeln!(out, "error: {}", err)?,
                }
            }
            _ = ticker.tick() => shell.tick(tick),
        }

        shell.write_events(&mut out)?;
        out.flush()?;
    }

    tracing::debug!("shell stopped");
    Ok(())
}
