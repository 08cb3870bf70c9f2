//! Local-machine implementations of the sweep collaborators.
//!
//! Profiles are the directories directly under a profile root (`C:\Users`
//! on Windows, `/home` elsewhere). Reserved and hidden directories are
//! special; directories owned by an active session are loaded. Deletion is a
//! recursive directory removal confined to the profile root.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use profsweep_core::{
    InventoryError, PrivilegeCheck, Profile, ProfileInventory, ProfileRemover, RemoveError,
    SessionIdentity,
};
use tracing::{debug, warn};

/// Directories under the profile root that belong to the OS, not a user.
pub const RESERVED_PROFILES: &[&str] = &[
    "All Users",
    "Default User",
    "systemprofile",
    "LocalService",
    "NetworkService",
    "lost+found",
];

pub fn default_profile_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Users")
    } else {
        PathBuf::from("/home")
    }
}

/// Drop a `DOMAIN\` prefix or `@domain` suffix.
pub fn bare_username(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.rsplit_once('\\').map_or(raw, |(_, user)| user);
    raw.split_once('@').map_or(raw, |(user, _)| user)
}

fn is_reserved(name: &str) -> bool {
    name.starts_with('.')
        || RESERVED_PROFILES
            .iter()
            .any(|r| r.eq_ignore_ascii_case(name))
}

// ---------------------------------------------------------------------------
// Identity and privilege
// ---------------------------------------------------------------------------

/// Identity and privilege of the process owner.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSession;

impl SessionIdentity for LocalSession {
    fn current_user(&self) -> String {
        resolve_current_user(|var| std::env::var(var).ok())
    }
}

/// Environment variables naming the interactive user, most specific first.
///
/// Under `sudo` the process runs as root with `USER`/`LOGNAME` rewritten, so
/// the invoking operator is only visible through `SUDO_USER`.
fn user_vars() -> &'static [&'static str] {
    if cfg!(windows) {
        &["USERNAME", "USER", "LOGNAME"]
    } else {
        &["SUDO_USER", "USERNAME", "USER", "LOGNAME"]
    }
}

fn resolve_current_user<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let raw = user_vars()
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
        .unwrap_or_default();
    bare_username(&raw).to_string()
}

impl PrivilegeCheck for LocalSession {
    fn is_admin(&self) -> bool {
        let elevated = if cfg!(windows) {
            // Only elevated shells may query the server service.
            Command::new("net")
                .arg("session")
                .output()
                .map(|o| o.status.success())
        } else {
            Command::new("id")
                .arg("-u")
                .output()
                .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "0")
        };
        match elevated {
            Ok(flag) => flag,
            Err(e) => {
                debug!(error = %e, "privilege probe could not run");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Active sessions
// ---------------------------------------------------------------------------

/// Where the set of logged-in users comes from.
#[derive(Debug, Clone)]
pub enum SessionSource {
    /// Ask the operating system at enumeration time.
    System,
    /// A fixed set of usernames.
    Fixed(BTreeSet<String>),
}

impl SessionSource {
    pub fn fixed<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SessionSource::Fixed(users.into_iter().map(|u| u.as_ref().to_lowercase()).collect())
    }

    /// Lowercased usernames with a live session.
    fn active_users(&self) -> Result<BTreeSet<String>, InventoryError> {
        match self {
            SessionSource::Fixed(users) => Ok(users.clone()),
            SessionSource::System => system_sessions(),
        }
    }
}

fn system_sessions() -> Result<BTreeSet<String>, InventoryError> {
    let mut users = BTreeSet::new();
    let me = LocalSession.current_user();
    if !me.is_empty() {
        users.insert(me.to_lowercase());
    }

    // `who` reads utmp; `query user` lists every signed-in Windows session,
    // including ones parked behind fast user switching.
    let (program, args): (&str, &[&str]) = if cfg!(windows) {
        ("query", &["user"])
    } else {
        ("who", &[])
    };

    let output = match Command::new(program).args(args).output() {
        Ok(output) => output,
        // Minimal hosts and Home editions ship without these tools.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(program, "session tool not available; only the current user is treated as logged in");
            return Ok(users);
        }
        Err(e) => {
            return Err(InventoryError::Sessions(format!(
                "failed to run {}: {}",
                program, e
            )))
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    if cfg!(windows) {
        // `query user` exits non-zero when no other session exists.
        users.extend(parse_query_user(&stdout));
    } else {
        if !output.status.success() {
            return Err(InventoryError::Sessions(format!(
                "who exited with {}",
                output.status
            )));
        }
        users.extend(parse_who(&stdout));
    }

    Ok(users)
}

/// First column of each `who` line, lowercased.
fn parse_who(output: &str) -> impl Iterator<Item = String> + '_ {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(|user| bare_username(user).to_lowercase())
}

/// Usernames from `query user`, skipping the header row. The caller's own
/// session is marked with a leading `>`.
fn parse_query_user(output: &str) -> impl Iterator<Item = String> + '_ {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(|user| user.trim_start_matches('>'))
        .filter(|user| !user.is_empty())
        .map(|user| bare_username(user).to_lowercase())
}

// ---------------------------------------------------------------------------
// Inventory and removal
// ---------------------------------------------------------------------------

/// Profiles as the immediate subdirectories of a profile root.
#[derive(Debug, Clone)]
pub struct DirectoryInventory {
    root: PathBuf,
    sessions: SessionSource,
}

impl DirectoryInventory {
    pub fn new(root: impl Into<PathBuf>, sessions: SessionSource) -> Self {
        Self {
            root: root.into(),
            sessions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProfileInventory for DirectoryInventory {
    fn list_profiles(&self) -> Result<Vec<Profile>, InventoryError> {
        let unreadable = |source| InventoryError::Unreadable {
            path: self.root.clone(),
            source,
        };
        let active = self.sessions.active_users()?;

        let mut profiles = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            // file_type() does not follow symlinks; linked dirs are not profiles.
            if !entry.file_type().map_err(unreadable)?.is_dir() {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let special = is_reserved(&name);
            let loaded = active.contains(&name.to_lowercase());
            profiles.push(Profile::from_path(path, special, loaded));
        }

        profiles.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root = %self.root.display(), count = profiles.len(), "profiles enumerated");
        Ok(profiles)
    }
}

/// Recursive directory removal, refusing anything outside the profile root.
#[derive(Debug, Clone)]
pub struct DirectoryRemover {
    root: PathBuf,
}

impl DirectoryRemover {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProfileRemover for DirectoryRemover {
    fn remove(&self, profile: &Profile) -> Result<(), RemoveError> {
        let path = &profile.path;
        if path.parent() != Some(self.root.as_path()) {
            return Err(RemoveError::OutsideRoot(path.clone()));
        }
        fs::remove_dir_all(path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SystemHost
// ---------------------------------------------------------------------------

/// All collaborators bound to the local machine.
#[derive(Debug, Clone)]
pub struct SystemHost {
    session: LocalSession,
    inventory: DirectoryInventory,
    remover: DirectoryRemover,
}

impl SystemHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            session: LocalSession,
            inventory: DirectoryInventory::new(root.clone(), SessionSource::System),
            remover: DirectoryRemover::new(root),
        }
    }
}

impl PrivilegeCheck for SystemHost {
    fn is_admin(&self) -> bool {
        self.session.is_admin()
    }
}

impl SessionIdentity for SystemHost {
    fn current_user(&self) -> String {
        self.session.current_user()
    }
}

impl ProfileInventory for SystemHost {
    fn list_profiles(&self) -> Result<Vec<Profile>, InventoryError> {
        self.inventory.list_profiles()
    }
}

impl ProfileRemover for SystemHost {
    fn remove(&self, profile: &Profile) -> Result<(), RemoveError> {
        self.remover.remove(profile)
    }
}
