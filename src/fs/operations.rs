use std::{io::ErrorKind, path::Path};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncWriteExt},
};

/// Reads the whole file under a shared lock. A missing file is reported as `None` rather than an
/// error, since absent records are a normal first-run state. Contents are returned as raw bytes,
/// decoding is up to the caller.
pub async fn read_locked(path: &Path) -> Result<Option<Vec<u8>>, io::Error> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    file.lock_shared()?;
    let mut contents = Vec::new();
    let result = file.read_to_end(&mut contents).await;
    file.unlock_async().await?;
    result?;

    Ok(Some(contents))
}

/// Replaces the file contents under an exclusive lock. The file is truncated only after the lock
/// is held, so concurrent readers never observe a half-written record from this process.
pub async fn write_locked(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let mut file = File::options()
        .write(true)
        .create(true)
        .read(true)
        .truncate(false)
        .open(path)
        .await?;

    file.lock_exclusive()?;
    let result = overwrite(&mut file, contents).await;
    file.unlock_async().await?;
    result
}

async fn overwrite(file: &mut File, contents: &[u8]) -> Result<(), io::Error> {
    file.set_len(0).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_data().await
}
