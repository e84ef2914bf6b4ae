//! Filesystem settings, passed explicitly to whatever needs them.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

//===========================================================================//

const DATA_DIR_NAME: &str = ".cartbus";
const SAVE_DIR_NAME: &str = "saves";

//===========================================================================//

/// Where on disk persistent data (battery RAM, save states) lives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    home: PathBuf,
}

impl Settings {
    /// Returns settings rooted at the given home folder.
    pub fn new(home: PathBuf) -> Settings {
        Settings { home }
    }

    /// Returns settings rooted at the user's home folder, as given by the
    /// `HOME` environment variable.
    pub fn from_env() -> io::Result<Settings> {
        match env::var_os("HOME") {
            Some(home) if !home.is_empty() => {
                Ok(Settings::new(PathBuf::from(home)))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "HOME is not set; pass --home",
            )),
        }
    }

    /// Returns the home folder.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns the folder where battery RAM and save states are kept.
    pub fn save_dir(&self) -> PathBuf {
        self.home.join(DATA_DIR_NAME).join(SAVE_DIR_NAME)
    }

    /// Returns the path of the battery RAM file for the given ROM file.
    pub fn battery_path(&self, rom: &Path) -> PathBuf {
        self.save_file(rom, "sav")
    }

    /// Returns the path of a numbered save state file for the given ROM
    /// file.
    pub fn state_path(&self, rom: &Path, slot: u8) -> PathBuf {
        self.save_file(rom, &format!("st{slot}"))
    }

    fn save_file(&self, rom: &Path, extension: &str) -> PathBuf {
        let mut name: OsString = rom
            .file_stem()
            .map_or_else(|| OsString::from("rom"), |stem| stem.to_os_string());
        name.push(".");
        name.push(extension);
        self.save_dir().join(name)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Settings;
    use std::path::{Path, PathBuf};

    #[test]
    fn save_paths() {
        let settings = Settings::new(PathBuf::from("/home/player"));
        assert_eq!(settings.home(), Path::new("/home/player"));
        assert_eq!(
            settings.save_dir(),
            PathBuf::from("/home/player/.cartbus/saves")
        );
        assert_eq!(
            settings.battery_path(Path::new("/roms/Lh32 Game.nes")),
            PathBuf::from("/home/player/.cartbus/saves/Lh32 Game.sav")
        );
        assert_eq!(
            settings.state_path(Path::new("roms/game.nes"), 3),
            PathBuf::from("/home/player/.cartbus/saves/game.st3")
        );
    }

    #[test]
    fn dotted_rom_names_keep_their_stem() {
        let settings = Settings::new(PathBuf::from("/h"));
        assert_eq!(
            settings.battery_path(Path::new("game.v1.1.nes")),
            PathBuf::from("/h/.cartbus/saves/game.v1.1.sav")
        );
    }

    #[test]
    fn rom_without_name() {
        let settings = Settings::new(PathBuf::from("/h"));
        assert_eq!(
            settings.battery_path(Path::new("/")),
            PathBuf::from("/h/.cartbus/saves/rom.sav")
        );
    }
}

//===========================================================================//
