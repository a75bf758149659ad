//! API key storage in the platform keyring.

use std::error::Error;
use std::fmt;

use keyring::Entry;

const KEYRING_SERVICE: &str = "chait";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors mean the backend was temporarily unavailable (a locked
/// keychain, a missing secret service); permanent ones carry the cause.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// Reads the stored key for `provider`; a missing entry is `Ok(None)`.
pub fn read_api_key(provider: &str) -> Result<Option<String>, KeyringAccessError> {
    let entry = Entry::new(KEYRING_SERVICE, provider)?;
    match entry.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn store_api_key(provider: &str, api_key: &str) -> Result<(), KeyringAccessError> {
    let entry = Entry::new(KEYRING_SERVICE, provider)?;
    entry.set_password(api_key)?;
    Ok(())
}
