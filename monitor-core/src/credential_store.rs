use crate::constants::storage;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// 凭据存储
///
/// 只保存一个 Bearer 令牌，读写都是同步的。读取时返回原样存储的值，
/// 空字符串表示未认证。
pub trait CredentialStore: Send + Sync {
    fn get_token(&self) -> String;

    fn set_token(&self, token: &str) -> Result<()>;
}

/// 进程内存储，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<String>,
}

impl MemoryCredentialStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(token.into()),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get_token(&self) -> String {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token.to_string();
        Ok(())
    }
}

/// 基于文件的键值存储，文件只对当前用户可读写
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// 打开数据目录下的私有存储文件，不存在时视为空
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir
            .as_ref()
            .join(storage::STORE_NAME)
            .with_extension(storage::STORE_EXTENSION);

        let values: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            debug!("凭据存储文件不存在，使用空存储: {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 先写入同目录下的临时文件（创建时即为 0600），再原子替换目标文件
    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let content = toml::to_string(values)?;

        let mut temp = tempfile::Builder::new()
            .prefix(storage::STORE_NAME)
            .suffix(".tmp")
            .tempfile_in(parent)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_token(&self) -> String {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(storage::KEY_API_TOKEN)
            .cloned()
            .unwrap_or_default()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // 写盘成功后才替换内存中的值
        let mut updated = values.clone();
        updated.insert(storage::KEY_API_TOKEN.to_string(), token.to_string());
        self.persist(&updated)?;
        *values = updated;
        info!("令牌已写入存储: {}", self.path.display());
        Ok(())
    }
}
