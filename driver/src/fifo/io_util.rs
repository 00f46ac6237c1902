use nix::libc;
use nix::sys::stat::Mode;
use std::{
    fs::{File, Permissions},
    os::{
        fd::{AsRawFd, IntoRawFd},
        unix::fs::{FileTypeExt, PermissionsExt},
    },
    path::Path,
};

pub(super) const FIFO_MODE: u32 = 0o666;

fn fifo_mode() -> Mode {
    Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IWGRP | Mode::S_IROTH | Mode::S_IWOTH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Entry {
    Missing,
    Fifo,
    Other,
}

pub(super) fn probe_entry(path: &Path) -> std::io::Result<Entry> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => Ok(Entry::Fifo),
        Ok(_) => Ok(Entry::Other),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entry::Missing),
        Err(e) => Err(e),
    }
}

/// Creates the pipe and forces its mode, since mkfifo(3) honors the umask.
pub(super) fn make_fifo(path: &Path) -> std::io::Result<()> {
    nix::unistd::mkfifo(path, fifo_mode())?;
    if let Err(e) = std::fs::set_permissions(path, Permissions::from_mode(FIFO_MODE)) {
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

/// Blocks until a writer opens the other end.
pub(super) fn open_reader(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

pub(super) fn read_blocking(file: &File, dst: &mut [u8]) -> std::io::Result<usize> {
    if dst.is_empty() {
        return Ok(0);
    }
    let n = unsafe {
        libc::read(
            file.as_raw_fd(),
            dst.as_mut_ptr() as *mut libc::c_void,
            dst.len(),
        )
    };
    if n < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(n as usize)
}

/// Closes the descriptor and reports close(2) failures, which dropping a
/// `File` would swallow.
pub(super) fn release(file: File) -> std::io::Result<()> {
    let fd = file.into_raw_fd();
    if unsafe { libc::close(fd) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

pub(super) fn unlink(path: &Path) -> std::io::Result<()> {
    nix::unistd::unlink(path)?;
    Ok(())
}
