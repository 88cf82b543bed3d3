// Host configuration and the command line.
//
// `HostConfig` is what `start_host` and `Session::new` consume; it carries
// a loaded `WordPool`, not a path, so neither of them does file I/O. The
// `clap` structs below are the command-line face of the same settings:
// `HostArgs::into_config` reads the optional word list and checks it can
// fill a board before anything binds a port.

use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use codenames_game::{GRID_SIZE, GameRules, WordPool};
use derive_more::{Display, Error};

pub const DEFAULT_PORT: u16 = 7878;
pub const DEFAULT_HOST_NAME: &str = "Host";
pub const DEFAULT_MAX_PEERS: usize = 8;

/// Settings for one hosted room.
#[derive(Clone, Debug)]
pub struct HostConfig {
    pub bind: IpAddr,
    /// 0 lets the OS pick a free port.
    pub port: u16,
    pub host_name: String,
    /// Connected peers allowed at once, not counting the host.
    pub max_peers: usize,
    pub rules: GameRules,
    /// Fixed rng seed, for replayable sessions. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub words: WordPool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            host_name: DEFAULT_HOST_NAME.into(),
            max_peers: DEFAULT_MAX_PEERS,
            rules: GameRules::default(),
            seed: None,
            words: WordPool::builtin(),
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("cannot read word list {}: {source}", path.display())]
    ReadWords { path: PathBuf, source: io::Error },
    #[display(
        "word list {} has {count} distinct words, a board needs {}",
        path.display(),
        GRID_SIZE
    )]
    TooFewWords { path: PathBuf, count: usize },
}

#[derive(Debug, Parser)]
#[command(name = "codenames", version, about = "Two-team word guessing game over TCP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Host a room and play from this terminal.
    Host(HostArgs),
    /// Join a room someone else is hosting.
    Join(JoinArgs),
}

#[derive(Debug, Args)]
pub struct HostArgs {
    /// Listen port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,
    /// Your display name.
    #[arg(long, default_value = DEFAULT_HOST_NAME)]
    pub name: String,
    /// Seed for board generation, for a replayable session.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Word list file: one word per line, `#` starts a comment.
    #[arg(long)]
    pub words: Option<PathBuf>,
    /// Maximum connected players, not counting you.
    #[arg(long, default_value_t = DEFAULT_MAX_PEERS)]
    pub max_peers: usize,
    /// Extra guesses allowed beyond the hint count.
    #[arg(long, default_value_t = 1, conflicts_with = "unlimited_guesses")]
    pub bonus_guesses: u32,
    /// Keep guessing until a miss or an explicit end of turn.
    #[arg(long)]
    pub unlimited_guesses: bool,
}

impl HostArgs {
    pub fn into_config(self) -> Result<HostConfig, ConfigError> {
        let words = match &self.words {
            Some(path) => load_word_list(path)?,
            None => WordPool::builtin(),
        };
        let bonus_guesses = if self.unlimited_guesses {
            None
        } else {
            Some(self.bonus_guesses)
        };
        Ok(HostConfig {
            bind: self.bind,
            port: self.port,
            host_name: self.name,
            max_peers: self.max_peers,
            rules: GameRules { bonus_guesses },
            seed: self.seed,
            words,
        })
    }
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    /// Host address, e.g. 192.168.1.20:7878.
    pub addr: String,
    /// Room code shown by the host.
    pub room: String,
    /// Your display name.
    #[arg(long, default_value = codenames_game::DEFAULT_PLAYER_NAME)]
    pub name: String,
}

/// Read a word list and make sure it can fill a board.
pub fn load_word_list(path: &Path) -> Result<WordPool, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadWords {
        path: path.to_path_buf(),
        source,
    })?;
    let pool = WordPool::from_lines(&text);
    if pool.len() < GRID_SIZE {
        return Err(ConfigError::TooFewWords {
            path: path.to_path_buf(),
            count: pool.len(),
        });
    }
    Ok(pool)
}
