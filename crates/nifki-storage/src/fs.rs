//! [`FsPageStore`]: pages as directories under a wiki root.
//!
//! Whole-file writes go through a temporary file in the same directory that
//! is renamed over the target, so readers never observe a half-written
//! source or properties file. New page directories (create and rename) are
//! assembled in a hidden temporary directory under the root and renamed into
//! place. Hidden names never pass page-name validation, so half-built
//! directories are invisible to [`PageStore::list_pages`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use nifki_core::{is_valid_page_name, GameProperties, PageName};

use crate::error::StorageError;
use crate::naming::{is_valid_resource_name, resource_name};
use crate::traits::PageStore;
use crate::types::{BuildResult, PageRecord};
use crate::{BUILD_DIR, PROPERTIES_FILE, RESOURCE_DIR, SOURCE_FILE};

/// File-system backed page store.
#[derive(Debug, Clone)]
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    /// Opens the store rooted at `root`, creating the root and the build
    /// output directory if they are missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        let build_dir = root.join(BUILD_DIR);
        fs::create_dir_all(&build_dir).map_err(StorageError::io(&build_dir))?;
        Ok(FsPageStore { root })
    }

    fn page_dir(&self, id: &PageName) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn resource_dir(&self, id: &PageName) -> PathBuf {
        self.page_dir(id).join(RESOURCE_DIR)
    }

    fn jar_path(&self, id: &PageName) -> PathBuf {
        self.root.join(BUILD_DIR).join(format!("{id}.jar"))
    }

    fn err_path(&self, id: &PageName) -> PathBuf {
        self.root.join(BUILD_DIR).join(format!("{id}.err"))
    }

    fn require_page(&self, id: &PageName) -> Result<PathBuf, StorageError> {
        let dir = self.page_dir(id);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StorageError::PageNotFound(id.clone()))
        }
    }

    fn read_source(&self, id: &PageName) -> Result<String, StorageError> {
        let path = self.require_page(id)?.join(SOURCE_FILE);
        match fs::read(&path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(StorageError::io(&path)(err)),
        }
    }

    /// Moves a fully populated temporary directory into place as `dest`.
    fn publish_dir(&self, staged: &Path, dest: &PageName) -> Result<(), StorageError> {
        let target = self.page_dir(dest);
        if target.exists() {
            return Err(StorageError::DestinationExists(dest.clone()));
        }
        fs::rename(staged, &target).map_err(|err| {
            if target.exists() {
                StorageError::DestinationExists(dest.clone())
            } else {
                StorageError::io(&target)(err)
            }
        })
    }

    fn staging_dir(&self) -> Result<tempfile::TempDir, StorageError> {
        tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.root)
            .map_err(StorageError::io(&self.root))
    }
}

impl PageStore for FsPageStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, id: &PageName) -> bool {
        self.page_dir(id).is_dir()
    }

    fn list_pages(&self) -> Result<Vec<PageName>, StorageError> {
        let entries = fs::read_dir(&self.root).map_err(StorageError::io(&self.root))?;
        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(StorageError::io(&self.root))?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_valid_page_name(&file_name) || !entry.path().is_dir() {
                continue;
            }
            if let Ok(name) = PageName::parse(file_name) {
                pages.push(name);
            }
        }
        pages.sort();
        Ok(pages)
    }

    fn create(&self, id: &PageName) -> Result<(), StorageError> {
        if self.exists(id) {
            return Err(StorageError::DestinationExists(id.clone()));
        }
        let staged = self.staging_dir()?;
        let res = staged.path().join(RESOURCE_DIR);
        fs::create_dir(&res).map_err(StorageError::io(&res))?;
        write_atomic(&staged.path().join(SOURCE_FILE), b"")?;
        write_atomic(
            &staged.path().join(PROPERTIES_FILE),
            GameProperties::default().encode().as_bytes(),
        )?;
        self.publish_dir(staged.path(), id)
    }

    fn load(&self, id: &PageName) -> Result<PageRecord, StorageError> {
        self.require_page(id)?;
        Ok(PageRecord {
            name: id.clone(),
            source: self.read_source(id)?,
            properties: self.read_properties(id)?,
            resources: self.list_resource_names(id)?,
            build: self.read_build_artifact(id)?,
        })
    }

    fn read_properties(&self, id: &PageName) -> Result<GameProperties, StorageError> {
        let path = self.require_page(id)?.join(PROPERTIES_FILE);
        let text = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => return Err(StorageError::io(&path)(err)),
        };
        GameProperties::decode(&text).map_err(|source| StorageError::Properties {
            page: id.clone(),
            source,
        })
    }

    fn create_by_copy(&self, source: &PageName, dest: &PageName) -> Result<(), StorageError> {
        let source_dir = self.require_page(source)?;
        if self.exists(dest) {
            return Err(StorageError::DestinationExists(dest.clone()));
        }
        let staged = self.staging_dir()?;
        copy_tree(&source_dir, staged.path())?;
        self.publish_dir(staged.path(), dest)
    }

    fn write_source(&self, id: &PageName, text: &str) -> Result<(), StorageError> {
        let dir = self.require_page(id)?;
        write_atomic(&dir.join(SOURCE_FILE), text.as_bytes())
    }

    fn write_properties(&self, id: &PageName, props: &GameProperties) -> Result<(), StorageError> {
        let dir = self.require_page(id)?;
        write_atomic(&dir.join(PROPERTIES_FILE), props.encode().as_bytes())
    }

    fn add_resource(
        &self,
        id: &PageName,
        suggested_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        self.require_page(id)?;
        let res = self.resource_dir(id);
        fs::create_dir_all(&res).map_err(StorageError::io(&res))?;
        let existing = self.list_resource_names(id)?;
        let name = resource_name(suggested_name, &existing);
        write_atomic(&res.join(&name), bytes)?;
        Ok(name)
    }

    fn list_resource_names(&self, id: &PageName) -> Result<Vec<String>, StorageError> {
        let res = self.require_page(id)?.join(RESOURCE_DIR);
        let entries = match fs::read_dir(&res) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(&res)(err)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(StorageError::io(&res))?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_resource(&self, id: &PageName, name: &str) -> Result<Vec<u8>, StorageError> {
        let not_found = || StorageError::ResourceNotFound {
            page: id.clone(),
            name: name.to_string(),
        };
        if !is_valid_resource_name(name) {
            return Err(not_found());
        }
        let path = self.resource_dir(id).join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(err) => Err(StorageError::io(&path)(err)),
        }
    }

    fn read_build_artifact(&self, id: &PageName) -> Result<BuildResult, StorageError> {
        let jar = self.jar_path(id);
        if jar.is_file() {
            return Ok(BuildResult::Success { artifact: jar });
        }
        let err = self.err_path(id);
        match fs::read(&err) {
            Ok(bytes) => Ok(BuildResult::Failure {
                diagnostic: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BuildResult::NotBuilt),
            Err(e) => Err(StorageError::io(&err)(e)),
        }
    }

    fn read_artifact_bytes(&self, id: &PageName) -> Result<Vec<u8>, StorageError> {
        let jar = self.jar_path(id);
        match fs::read(&jar) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StorageError::ArtifactNotFound(id.clone()))
            }
            Err(err) => Err(StorageError::io(&jar)(err)),
        }
    }

    fn clear_build_result(&self, id: &PageName) -> Result<(), StorageError> {
        remove_if_present(&self.jar_path(id))?;
        remove_if_present(&self.err_path(id))
    }

    fn record_build_failure(&self, id: &PageName, diagnostic: &str) -> Result<(), StorageError> {
        let build_dir = self.root.join(BUILD_DIR);
        fs::create_dir_all(&build_dir).map_err(StorageError::io(&build_dir))?;
        remove_if_present(&self.jar_path(id))?;
        write_atomic(&self.err_path(id), diagnostic.as_bytes())
    }
}

/// Writes `bytes` to `path` via a sibling temporary file and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(StorageError::io(dir))?;
    tmp.write_all(bytes).map_err(StorageError::io(tmp.path()))?;
    if let Err(err) = tmp.persist(path) {
        return Err(StorageError::io(path)(err.error));
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StorageError::io(path)(err)),
    }
}

/// Recursively copies the contents of `from` into the existing directory `to`.
fn copy_tree(from: &Path, to: &Path) -> Result<(), StorageError> {
    let entries = fs::read_dir(from).map_err(StorageError::io(from))?;
    for entry in entries {
        let entry = entry.map_err(StorageError::io(from))?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(StorageError::io(&src))?;
        if file_type.is_dir() {
            fs::create_dir(&dst).map_err(StorageError::io(&dst))?;
            copy_tree(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).map_err(StorageError::io(&src))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PageName {
        PageName::parse(s).unwrap()
    }

    fn store() -> (tempfile::TempDir, FsPageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::open(dir.path().join("wiki")).unwrap();
        (dir, store)
    }

    fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut out = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(d) = stack.pop() {
            for entry in fs::read_dir(&d).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    out.push((path.clone(), fs::read(&path).unwrap()));
                }
            }
        }
        out.sort();
        out
    }

    #[test]
    fn create_then_load_empty_page() {
        let (_tmp, store) = store();
        let id = name("mygame");
        assert!(!store.exists(&id));
        store.create(&id).unwrap();
        assert!(store.exists(&id));

        let record = store.load(&id).unwrap();
        assert_eq!(record.name, id);
        assert_eq!(record.source, "");
        assert_eq!(record.properties, GameProperties::default());
        assert!(record.resources.is_empty());
        assert_eq!(record.build, BuildResult::NotBuilt);
    }

    #[test]
    fn create_twice_is_rejected() {
        let (_tmp, store) = store();
        store.create(&name("mygame")).unwrap();
        assert!(matches!(
            store.create(&name("mygame")),
            Err(StorageError::DestinationExists(_))
        ));
    }

    #[test]
    fn load_missing_page_is_not_found() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.load(&name("nothere")),
            Err(StorageError::PageNotFound(_))
        ));
    }

    #[test]
    fn writes_are_read_back() {
        let (_tmp, store) = store();
        let id = name("mygame");
        store.create(&id).unwrap();
        let props = GameProperties {
            tagline: "Catch the stars".to_string(),
            width: 400,
            height: 300,
            frame_interval_ms: 25,
            debug: true,
        };
        store.write_source(&id, "PLOT 1 2\n").unwrap();
        store.write_properties(&id, &props).unwrap();

        let record = store.load(&id).unwrap();
        assert_eq!(record.source, "PLOT 1 2\n");
        assert_eq!(record.properties, props);
        let path = store.root().join("mygame").join(PROPERTIES_FILE);
        assert_eq!(fs::read_to_string(path).unwrap(), props.encode());
    }

    #[test]
    fn writes_to_missing_page_fail() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.write_source(&name("ghost"), "x"),
            Err(StorageError::PageNotFound(_))
        ));
        assert!(!store.root().join("ghost").exists());
    }

    #[test]
    fn copy_duplicates_the_whole_tree() {
        let (_tmp, store) = store();
        let orig = name("original");
        store.create(&orig).unwrap();
        store.write_source(&orig, "source text").unwrap();
        store.add_resource(&orig, "ship.png", b"ship").unwrap();

        store.create_by_copy(&orig, &name("sequel")).unwrap();
        let copy = store.load(&name("sequel")).unwrap();
        assert_eq!(copy.source, "source text");
        assert_eq!(copy.resources, vec!["ship".to_string()]);
        let image = store.read_resource(&name("sequel"), "ship").unwrap();
        assert_eq!(image, b"ship");
        assert_eq!(store.load(&orig).unwrap().source, "source text");
    }

    #[test]
    fn copy_onto_existing_page_changes_nothing() {
        let (_tmp, store) = store();
        let a = name("alpha");
        let b = name("bravo");
        store.create(&a).unwrap();
        store.create(&b).unwrap();
        store.write_source(&a, "alpha source").unwrap();
        store.write_source(&b, "bravo source").unwrap();
        let before_a = snapshot(&store.root().join("alpha"));
        let before_b = snapshot(&store.root().join("bravo"));

        let err = store.create_by_copy(&a, &b).unwrap_err();
        assert!(matches!(err, StorageError::DestinationExists(ref n) if *n == b));
        assert_eq!(snapshot(&store.root().join("alpha")), before_a);
        assert_eq!(snapshot(&store.root().join("bravo")), before_b);
        assert_eq!(store.list_pages().unwrap(), vec![a, b]);
    }

    #[test]
    fn copy_from_missing_page_is_not_found() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.create_by_copy(&name("ghost"), &name("other")),
            Err(StorageError::PageNotFound(_))
        ));
        assert!(!store.exists(&name("other")));
    }

    #[test]
    fn same_suggested_name_gets_suffixes() {
        let (_tmp, store) = store();
        let id = name("mygame");
        store.create(&id).unwrap();
        assert_eq!(store.add_resource(&id, "logo.png", b"one").unwrap(), "logo");
        assert_eq!(
            store.add_resource(&id, "logo.png", b"two").unwrap(),
            "logo1"
        );
        assert_eq!(
            store.list_resource_names(&id).unwrap(),
            vec!["logo".to_string(), "logo1".to_string()]
        );
        assert_eq!(store.read_resource(&id, "logo1").unwrap(), b"two");
    }

    #[test]
    fn resource_reads_reject_bad_names() {
        let (_tmp, store) = store();
        let id = name("mygame");
        store.create(&id).unwrap();
        assert!(matches!(
            store.read_resource(&id, "../properties.txt"),
            Err(StorageError::ResourceNotFound { .. })
        ));
        assert!(matches!(
            store.read_resource(&id, "missing"),
            Err(StorageError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn build_markers_resolve_in_order() {
        let (_tmp, store) = store();
        let id = name("mygame");
        store.create(&id).unwrap();
        assert_eq!(
            store.read_build_artifact(&id).unwrap(),
            BuildResult::NotBuilt
        );

        let diagnostic = "line 4: syntax error";
        store.record_build_failure(&id, diagnostic).unwrap();
        assert_eq!(
            store.read_build_artifact(&id).unwrap(),
            BuildResult::Failure {
                diagnostic: diagnostic.to_string()
            }
        );

        let jar = store.root().join(BUILD_DIR).join("mygame.jar");
        fs::write(&jar, b"PK").unwrap();
        assert_eq!(
            store.read_build_artifact(&id).unwrap(),
            BuildResult::Success { artifact: jar }
        );
        assert_eq!(store.read_artifact_bytes(&id).unwrap(), b"PK");

        store.record_build_failure(&id, "again").unwrap();
        assert!(matches!(
            store.read_build_artifact(&id).unwrap(),
            BuildResult::Failure { .. }
        ));

        store.clear_build_result(&id).unwrap();
        assert_eq!(
            store.read_build_artifact(&id).unwrap(),
            BuildResult::NotBuilt
        );
        assert!(matches!(
            store.read_artifact_bytes(&id),
            Err(StorageError::ArtifactNotFound(_))
        ));
    }

    #[test]
    fn listing_skips_non_pages() {
        let (_tmp, store) = store();
        store.create(&name("zulu")).unwrap();
        store.create(&name("alpha")).unwrap();
        fs::create_dir(store.root().join(".staging-leftover")).unwrap();
        fs::write(store.root().join("README"), b"not a page").unwrap();
        let pages = store.list_pages().unwrap();
        assert_eq!(pages, vec![name("alpha"), name("zulu")]);
    }

    #[test]
    fn malformed_properties_surface_as_errors() {
        let (_tmp, store) = store();
        let id = name("mygame");
        store.create(&id).unwrap();
        fs::write(store.root().join("mygame").join(PROPERTIES_FILE), "oops\n").unwrap();
        assert!(matches!(
            store.read_properties(&id),
            Err(StorageError::Properties { .. })
        ));
    }

    #[test]
    fn record_serializes_build_state() {
        let (_tmp, store) = store();
        let id = name("mygame");
        store.create(&id).unwrap();
        let json = serde_json::to_value(store.load(&id).unwrap()).unwrap();
        assert_eq!(json["name"], "mygame");
        assert_eq!(json["build"]["status"], "not_built");
        assert_eq!(json["properties"]["width"], 256);
    }
}
