//! # smb utils
//!
//! SMB protocol utilities

use libc::mode_t;
use pavao::{SmbDirentType, SmbStat};
use remotefs::{
    fs::{FileType, Metadata, UnixPex},
    File,
};
use std::path::PathBuf;

/// Convert `SmbStat` of the share entry at `uri` to `File`
pub fn smbstat_to_file<S: AsRef<str>>(uri: S, stat: SmbStat) -> File {
    let mode = mode_t::from(stat.mode);
    File {
        path: PathBuf::from(uri.as_ref()),
        metadata: Metadata::default()
            .accessed(stat.accessed)
            .created(stat.created)
            .file_type(get_file_type_from_stat(&stat))
            .gid(stat.gid)
            .mode(UnixPex::from(mode as u32))
            .modified(stat.modified)
            .size(stat.size)
            .uid(stat.uid),
    }
}

/// Whether a dirent is worth reporting in a listing (files and directories only)
pub fn is_listable(kind: SmbDirentType, name: &str) -> bool {
    (kind == SmbDirentType::File || kind == SmbDirentType::Dir) && name != "." && name != ".."
}

fn get_file_type_from_stat(stat: &SmbStat) -> FileType {
    match stat.mode {
        mode if mode.is_dir() => FileType::Directory,
        mode if mode.is_symlink() => FileType::Symlink,
        _ => FileType::File,
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn should_list_only_files_and_dirs() {
        assert!(is_listable(SmbDirentType::File, "a.txt"));
        assert!(is_listable(SmbDirentType::Dir, "em63"));
        assert!(!is_listable(SmbDirentType::Dir, "."));
        assert!(!is_listable(SmbDirentType::Dir, ".."));
        assert!(!is_listable(SmbDirentType::Link, "a.lnk"));
    }
}
