use crate::error::{Error, Result};
use crate::kwargs::Kwargs;
use crate::traits::Device;
use std::collections::BTreeMap;

pub type FindFn = fn(&Kwargs) -> Vec<Kwargs>;
pub type MakeFn = fn(&Kwargs) -> Result<Box<dyn Device>>;

pub const DRIVER_ARG: &str = "driver";

#[derive(Debug, Clone, Copy)]
struct Entry {
    find: FindFn,
    make: MakeFn,
}

/// Driver factories keyed by driver name.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every driver built into this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        #[cfg(unix)]
        crate::fifo::register(&mut registry);
        registry
    }

    pub fn register(&mut self, key: &str, find: FindFn, make: MakeFn) {
        self.entries.insert(key.to_string(), Entry { find, make });
    }

    pub fn drivers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn find(&self, args: &Kwargs) -> Vec<Kwargs> {
        let wanted = args.get(DRIVER_ARG);
        let mut results = Vec::new();
        for (key, entry) in &self.entries {
            if wanted.is_some_and(|w| w != key) {
                continue;
            }
            for mut found in (entry.find)(args) {
                found.insert(DRIVER_ARG, key.as_str());
                results.push(found);
            }
        }
        results
    }

    pub fn make(&self, args: &Kwargs) -> Result<Box<dyn Device>> {
        let entry = match args.get(DRIVER_ARG) {
            Some(key) => self
                .entries
                .get(key)
                .ok_or_else(|| Error::UnknownDriver(key.to_string()))?,
            None if self.entries.len() == 1 => self
                .entries
                .values()
                .next()
                .ok_or_else(|| Error::UnknownDriver(String::new()))?,
            None => return Err(Error::UnknownDriver(String::new())),
        };
        (entry.make)(args)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn builtin_registers_filesdr() {
        let registry = Registry::with_builtin();
        assert_eq!(registry.drivers().collect::<Vec<_>>(), vec!["filesdr"]);
    }

    #[test]
    fn find_stamps_driver_key() {
        let registry = Registry::with_builtin();
        let found = registry.find(&Kwargs::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("label"), Some("filesdr"));
        assert_eq!(found[0].get("driver"), Some("filesdr"));
    }

    #[test]
    fn find_filters_by_driver() {
        let registry = Registry::with_builtin();
        assert!(registry.find(&Kwargs::parse("driver=rtlsdr")).is_empty());
        assert_eq!(registry.find(&Kwargs::parse("driver=filesdr")).len(), 1);
    }

    #[test]
    fn make_by_name_passes_args() {
        let registry = Registry::with_builtin();
        let device = registry
            .make(&Kwargs::parse("driver=filesdr, fifo=/tmp/made"))
            .unwrap();
        assert_eq!(device.driver_key(), "filesdr");
        assert_eq!(device.read_setting("fifo"), "/tmp/made");
        assert_eq!(device.num_channels(Direction::Rx), 1);
    }

    #[test]
    fn make_without_driver_uses_the_only_one() {
        let registry = Registry::with_builtin();
        let device = registry.make(&Kwargs::new()).unwrap();
        assert_eq!(device.hardware_key(), "fifo");
    }

    #[test]
    fn make_unknown_driver_fails() {
        let registry = Registry::with_builtin();
        let err = registry.make(&Kwargs::parse("driver=hackrf")).err().unwrap();
        assert!(matches!(err, Error::UnknownDriver(ref k) if k == "hackrf"));
        assert!(matches!(
            Registry::new().make(&Kwargs::new()),
            Err(Error::UnknownDriver(_))
        ));
    }
}
