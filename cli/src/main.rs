mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use migrate::services::config::load_config;

#[derive(Parser, Debug)]
#[command(name = "gallery-migrate", version, about = "Migrate Gallery 2 albums to Koken")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON); defaults to ./gallery-migrate.*
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Send Gallery requests to localhost with the configured host as virtual host
    #[arg(long, global = true)]
    gallery_local: bool,

    /// Send Koken requests to localhost with the configured host as virtual host
    #[arg(long, global = true)]
    koken_local: bool,

    /// Verbose HTTP logging
    #[arg(long, global = true)]
    http_debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Migrate every Gallery album to Koken
    Migrate,

    /// Gallery 2 operations
    #[command(subcommand)]
    Gallery(GalleryCommand),

    /// Koken operations
    #[command(subcommand)]
    Koken(KokenCommand),
}

#[derive(Subcommand, Debug)]
enum GalleryCommand {
    /// Authenticate with the configured username and password
    Login,
    /// Print all albums
    Albums,
    /// Print the image listing of an album
    AlbumImages { album: String },
    /// Download every image of an album
    Download {
        album: String,
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum KokenCommand {
    /// Create a public album
    CreateAlbum {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Upload a local image file
    UploadPhoto { path: PathBuf },
    /// Set an album's published date from its first photo's capture date
    ResetAlbumDate { album_id: u64 },
}

fn init_tracing(http_debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if http_debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("migrate=info,gallery_migrate=info,warn")
        }
    });

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.http_debug)?;

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    config.gallery.local |= cli.gallery_local;
    config.koken.local |= cli.koken_local;
    config.transport.http_debug |= cli.http_debug;

    match cli.command {
        Command::Migrate => commands::run_migration(&config).await,
        Command::Gallery(command) => match command {
            GalleryCommand::Login => commands::gallery_login(&config).await,
            GalleryCommand::Albums => commands::gallery_albums(&config).await,
            GalleryCommand::AlbumImages { album } => {
                commands::gallery_album_images(&config, &album).await
            }
            GalleryCommand::Download { album, output } => {
                commands::gallery_download(&config, &album, &output).await
            }
        },
        Command::Koken(command) => match command {
            KokenCommand::CreateAlbum { title, description } => {
                commands::koken_create_album(&config, &title, description.as_deref()).await
            }
            KokenCommand::UploadPhoto { path } => commands::koken_upload_photo(&config, &path).await,
            KokenCommand::ResetAlbumDate { album_id } => {
                commands::koken_reset_album_date(&config, album_id).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gallery-migrate",
            "gallery",
            "download",
            "7",
            "--output",
            "out",
            "--gallery-local",
        ])
        .unwrap();

        assert!(cli.gallery_local);
        assert!(!cli.koken_local);
        match cli.command {
            Command::Gallery(GalleryCommand::Download { album, output }) => {
                assert_eq!(album, "7");
                assert_eq!(output, PathBuf::from("out"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_reset_album_date_needs_numeric_id() {
        assert!(Cli::try_parse_from(["gallery-migrate", "koken", "reset-album-date", "abc"]).is_err());
    }
}
