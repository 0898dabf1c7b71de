use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use cheerleader_client::{Client, client::DEFAULT_BASE_URL};
use cheerleader_controls::{
    database::Database,
    events::PlayerEvent,
    media_session::MediaSession,
    notification::{Notification, NotificationBroadcast},
    player::Player,
    playlist::Playlist,
    sink::Sink,
};
use cheerleader_models::{Comment, Track, User};
use clap::{Parser, Subcommand};
use snafu::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod console;
mod surface;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SoundCloud application client id
    #[arg(long, env = "SOUNDCLOUD_CLIENT_ID")]
    client_id: String,

    /// Database holding settings, last playlist and offline responses
    #[arg(long, env = "CHEERLEADER_DATABASE")]
    database: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log more, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a user profile
    User { id: u64 },
    /// List the tracks of a user
    Tracks { id: u64 },
    /// Show a single track
    Track { id: u64 },
    /// List the comments posted on a track
    Comments { track_id: u64 },
    /// Show a user profile with all its tracks
    Artist { id: u64 },
    /// Play the tracks of an artist, or the last playlist
    Play {
        #[arg(long, conflicts_with = "resume", required_unless_present = "resume")]
        artist: Option<u64>,
        /// Position of the first track to play
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long)]
        shuffle: bool,
        /// Continue with the playlist of the previous session
        #[arg(long)]
        resume: bool,
    },
    /// Forget every response kept for offline use
    ClearCache,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("{source}"))]
    Client { source: cheerleader_client::Error },

    #[snafu(display("{source}"))]
    Controls {
        source: cheerleader_controls::error::Error,
    },

    #[snafu(display("No data directory available, use --database"))]
    NoDataDir,

    #[snafu(display("Nothing to play, the saved playlist is empty"))]
    NothingToPlay,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Error::Client { source } = &err
                && source.is_remote()
            {
                eprintln!("SoundCloud is unreachable and no offline copy is stored");
            }
            eprintln!("{}", snafu::Report::from_error(err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "cheerleader=info,cheerleader_controls=info,cheerleader_client=warn",
        1 => "cheerleader=debug,cheerleader_controls=debug,cheerleader_client=debug",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let database_path = match cli.database {
        Some(path) => path,
        None => Database::default_path().context(NoDataDirSnafu)?,
    };

    let database = Arc::new(Database::new(&database_path).await.context(ControlsSnafu)?);
    let offline_cache = database.offline_cache().await.context(ControlsSnafu)?;

    let client = Arc::new(
        Client::builder(cli.client_id)
            .base_url(cli.base_url)
            .offline_cache(offline_cache.clone())
            .build()
            .context(ClientSnafu)?,
    );

    match cli.command {
        Commands::User { id } => {
            print_user(&client.user(id).await.context(ClientSnafu)?);
        }
        Commands::Tracks { id } => {
            let tracks = client.user_tracks(id).await.context(ClientSnafu)?;
            tracks.iter().enumerate().for_each(print_track);
        }
        Commands::Track { id } => {
            print_track((0, &client.track(id).await.context(ClientSnafu)?));
        }
        Commands::Comments { track_id } => {
            let comments = client.track_comments(track_id).await.context(ClientSnafu)?;
            comments.iter().for_each(print_comment);
        }
        Commands::Artist { id } => {
            let profile = client.artist_profile(id).await.context(ClientSnafu)?;
            print_user(&profile.user);
            println!();
            profile.tracks.iter().enumerate().for_each(print_track);
        }
        Commands::ClearCache => {
            let removed = offline_cache.clear().await.context(ClientSnafu)?;
            println!("Removed {removed} cached responses");
        }
        Commands::Play {
            artist,
            index,
            shuffle,
            resume,
        } => {
            play(client, database, artist, index, shuffle, resume).await?;
        }
    }

    Ok(())
}

async fn play(
    client: Arc<Client>,
    database: Arc<Database>,
    artist: Option<u64>,
    index: usize,
    shuffle: bool,
    resume: bool,
) -> Result<(), Error> {
    let volume = database.volume().await.context(ControlsSnafu)?;
    let playlist = match resume {
        true => database.playlist().await.context(ControlsSnafu)?,
        false => Playlist::new(),
    };

    if artist.is_none() && playlist.is_empty() {
        return NothingToPlaySnafu.fail();
    }

    let notifications = Arc::new(NotificationBroadcast::new());
    let sink = Sink::new(notifications.clone(), volume);
    let mut player = Player::new(
        sink,
        playlist,
        client,
        volume,
        notifications.clone(),
        database,
    );

    let controls = player.controls();
    match artist {
        Some(user_id) => controls.play_artist(user_id, index, shuffle),
        None => controls.play(),
    }

    let (exit_sender, exit_receiver) = broadcast::channel(5);

    let mut media_session = MediaSession::new(
        controls.clone(),
        player.status(),
        player.playlist(),
        player.position(),
    );
    media_session.add_surface(surface::StatusLine::default());
    let session_exit = exit_sender.subscribe();
    let media_session = tokio::spawn(async move { media_session.run(session_exit).await });

    let listener = tokio::spawn(log_events(
        player.events(),
        notifications.subscribe(),
        exit_sender.subscribe(),
    ));

    let console = tokio::spawn(console::run(
        controls,
        player.playlist(),
        player.volume(),
        exit_sender,
    ));

    player
        .player_loop(exit_receiver)
        .await
        .context(ControlsSnafu)?;

    console.abort();
    let _ = tokio::join!(media_session, listener);
    Ok(())
}

async fn log_events(
    mut events: broadcast::Receiver<PlayerEvent>,
    mut notifications: broadcast::Receiver<Notification>,
    mut exit_receiver: broadcast::Receiver<bool>,
) {
    loop {
        tokio::select! {
            Ok(event) = events.recv() => match event {
                PlayerEvent::TrackAdded(track) => info!(title = %track.title, "added to playlist"),
                PlayerEvent::TrackRemoved { track, index } => {
                    info!(title = %track.title, index, "removed from playlist")
                }
                PlayerEvent::SeekTo(time) => debug!(position = %format_duration(time), "seek"),
                PlayerEvent::BufferingStarted => debug!("buffering"),
                PlayerEvent::BufferingEnded => debug!("buffered"),
                PlayerEvent::Progress(_) => {}
                PlayerEvent::Playing { .. } | PlayerEvent::Paused | PlayerEvent::Stopped => {}
            },
            Ok(notification) = notifications.recv() => match notification {
                Notification::Error(message) => error!("{message}"),
                Notification::Warning(message) => warn!("{message}"),
                Notification::Success(message) | Notification::Info(message) => info!("{message}"),
            },
            Ok(exit) = exit_receiver.recv() => {
                if exit {
                    break;
                }
            }
            else => break,
        }
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn print_user(user: &User) {
    println!("{} ({})", user.username, user.id);
    if let Some(full_name) = &user.full_name {
        println!("  name:      {full_name}");
    }
    let location = [user.city.as_deref(), user.country.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    if !location.is_empty() {
        println!("  location:  {location}");
    }
    println!("  tracks:    {}", user.track_count);
    println!(
        "  followers: {}  following: {}",
        user.followers_count, user.followings_count
    );
    if let Some(url) = &user.permalink_url {
        println!("  {url}");
    }
}

fn print_track((index, track): (usize, &Track)) {
    println!(
        "{index:>3}. {} [{}] ({}){}",
        track.title,
        format_duration(track.duration()),
        track.id,
        if track.streamable { "" } else { " not streamable" }
    );
}

fn print_comment(comment: &Comment) {
    let author = comment
        .user
        .as_ref()
        .map(|user| user.username.as_str())
        .unwrap_or("unknown");
    let at = comment
        .position()
        .map(format_duration)
        .unwrap_or_else(|| "-".to_string());

    println!("[{at}] {author}: {}", comment.body);
}
