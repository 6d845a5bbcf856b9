//! Host environment queries used to fill in unset options.

use std::io;

/// Source of the hostname and process id
pub trait HostEnv {
    fn hostname(&self) -> io::Result<String>;
    fn process_id(&self) -> u32;
}

/// The operating system the process runs on
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl HostEnv for SystemHost {
    fn hostname(&self) -> io::Result<String> {
        hostname::get()?.into_string().map_err(|raw| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("hostname is not valid UTF-8: {:?}", raw),
            )
        })
    }

    fn process_id(&self) -> u32 {
        std::process::id()
    }
}
