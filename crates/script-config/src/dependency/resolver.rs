//! Dependency resolvers
//!
//! A [`DependencyResolver`] turns a [`DependencyCoordinate`] into a concrete
//! artifact. Resolvers are shared between concurrently running refinements,
//! so any state they keep must only ever hold complete results.

use async_trait::async_trait;
use moka::future::Cache;
use script_api::ResolvedDependency;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::coordinate::DependencyCoordinate;
use crate::error::{Error, Result};

const FILE_SCHEME: &str = "file://";

/// Resolves dependency coordinates to artifacts
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Resolve `coordinate`, consulting `repositories` where applicable
    async fn resolve(
        &self,
        coordinate: &DependencyCoordinate,
        repositories: &[String],
    ) -> Result<ResolvedDependency>;
}

fn not_found(coordinate: &DependencyCoordinate, reason: impl Into<String>) -> Error {
    Error::UnresolvedDependency {
        coordinate: coordinate.to_string(),
        reason: reason.into(),
    }
}

/// Resolver backed by a fixed table of known artifacts
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    artifacts: HashMap<String, PathBuf>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact for a coordinate string
    pub fn with_artifact(mut self, coordinate: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.artifacts.insert(coordinate.into(), path.into());
        self
    }
}

#[async_trait]
impl DependencyResolver for InMemoryResolver {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn resolve(
        &self,
        coordinate: &DependencyCoordinate,
        _repositories: &[String],
    ) -> Result<ResolvedDependency> {
        let key = coordinate.to_string();
        self.artifacts
            .get(&key)
            .map(|path| ResolvedDependency {
                coordinate: key.clone(),
                path: path.clone(),
            })
            .ok_or_else(|| not_found(coordinate, "no such artifact"))
    }
}

/// Resolver for repositories laid out on the local filesystem
///
/// Artifacts live at `<root>/<group path>/<artifact>/<version>/<artifact>-<version>.jar`,
/// where the group path replaces dots with directory separators. Besides
/// its own root, the resolver searches every `file://` repository it is
/// given. Other repository kinds are skipped.
#[derive(Debug, Clone)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path an artifact would have below `root`
    pub fn artifact_path(root: &Path, coordinate: &DependencyCoordinate) -> PathBuf {
        let mut path = root.to_path_buf();
        if let Some(group) = &coordinate.group {
            for segment in group.split('.') {
                path.push(segment);
            }
        }
        path.push(&coordinate.artifact);
        path.push(&coordinate.version);
        path.push(format!("{}-{}.jar", coordinate.artifact, coordinate.version));
        path
    }

    fn search_roots(&self, repositories: &[String]) -> Vec<PathBuf> {
        let mut roots = vec![self.root.clone()];
        for repository in repositories {
            if let Some(dir) = repository.strip_prefix(FILE_SCHEME) {
                let dir = PathBuf::from(dir);
                if !roots.contains(&dir) {
                    roots.push(dir);
                }
            }
        }
        roots
    }
}

#[async_trait]
impl DependencyResolver for LocalRepositoryResolver {
    fn name(&self) -> &str {
        "local-repository"
    }

    async fn resolve(
        &self,
        coordinate: &DependencyCoordinate,
        repositories: &[String],
    ) -> Result<ResolvedDependency> {
        let roots = self.search_roots(repositories);
        for root in &roots {
            let candidate = Self::artifact_path(root, coordinate);
            match tokio::fs::metadata(&candidate).await {
                Ok(metadata) if metadata.is_file() => {
                    tracing::debug!(%coordinate, path = ?candidate, "Resolved from local repository");
                    return Ok(ResolvedDependency {
                        coordinate: coordinate.to_string(),
                        path: candidate,
                    });
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Err(not_found(
            coordinate,
            format!("not found in {} local repositories", roots.len()),
        ))
    }
}

/// Tries resolvers in order, first success wins
#[derive(Clone, Default)]
pub struct CompoundResolver {
    resolvers: Vec<Arc<dyn DependencyResolver>>,
}

impl CompoundResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[async_trait]
impl DependencyResolver for CompoundResolver {
    fn name(&self) -> &str {
        "compound"
    }

    async fn resolve(
        &self,
        coordinate: &DependencyCoordinate,
        repositories: &[String],
    ) -> Result<ResolvedDependency> {
        let mut reasons = Vec::new();
        for resolver in &self.resolvers {
            match resolver.resolve(coordinate, repositories).await {
                Ok(resolved) => return Ok(resolved),
                Err(Error::UnresolvedDependency { reason, .. }) => {
                    reasons.push(format!("{}: {}", resolver.name(), reason));
                }
                Err(e) => return Err(e),
            }
        }
        if reasons.is_empty() {
            reasons.push("no resolvers configured".to_string());
        }
        Err(not_found(coordinate, reasons.join("; ")))
    }
}

type CacheKey = (DependencyCoordinate, Vec<String>);

/// Number of resolutions a [`CachingResolver`] keeps by default
pub const DEFAULT_RESOLUTION_CAPACITY: u64 = 4096;

/// Remembers successful resolutions of an inner resolver
///
/// The cache is bounded and evicts entries once `max_entries` is reached.
/// An entry is only written once the inner resolution has completed, so a
/// cancelled or failed resolution never leaves anything behind.
pub struct CachingResolver {
    inner: Arc<dyn DependencyResolver>,
    cache: Cache<CacheKey, ResolvedDependency>,
}

impl CachingResolver {
    pub fn new(inner: Arc<dyn DependencyResolver>) -> Self {
        Self::with_capacity(inner, DEFAULT_RESOLUTION_CAPACITY)
    }

    pub fn with_capacity(inner: Arc<dyn DependencyResolver>, max_entries: u64) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Number of cached resolutions, after pending evictions are applied
    pub async fn cached(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Drop every cached resolution
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl DependencyResolver for CachingResolver {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn resolve(
        &self,
        coordinate: &DependencyCoordinate,
        repositories: &[String],
    ) -> Result<ResolvedDependency> {
        let key = (coordinate.clone(), repositories.to_vec());
        if let Some(resolved) = self.cache.get(&key).await {
            tracing::debug!(%coordinate, "Dependency cache hit");
            return Ok(resolved);
        }

        let resolved = self.inner.resolve(coordinate, repositories).await?;
        self.cache.insert(key, resolved.clone()).await;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn coordinate(raw: &str) -> DependencyCoordinate {
        DependencyCoordinate::parse(raw).unwrap()
    }

    struct CountingResolver {
        calls: AtomicUsize,
        inner: InMemoryResolver,
    }

    #[async_trait]
    impl DependencyResolver for CountingResolver {
        fn name(&self) -> &str {
            "counting"
        }

        async fn resolve(
            &self,
            coordinate: &DependencyCoordinate,
            repositories: &[String],
        ) -> Result<ResolvedDependency> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve(coordinate, repositories).await
        }
    }

    #[tokio::test]
    async fn test_in_memory_resolves_known_artifacts() {
        let resolver = InMemoryResolver::new().with_artifact("lib:1.0", "/libs/lib-1.0.jar");

        let resolved = resolver.resolve(&coordinate("lib:1.0"), &[]).await.unwrap();
        assert_eq!(resolved.coordinate, "lib:1.0");
        assert_eq!(resolved.path, PathBuf::from("/libs/lib-1.0.jar"));

        let err = resolver.resolve(&coordinate("lib:2.0"), &[]).await.unwrap_err();
        assert!(err.to_string().contains("lib:2.0"));
    }

    #[test]
    fn test_artifact_path_uses_group_directories() {
        let path = LocalRepositoryResolver::artifact_path(
            Path::new("/repo"),
            &coordinate("org.example:lib:1.0"),
        );
        assert_eq!(
            path,
            PathBuf::from("/repo/org/example/lib/1.0/lib-1.0.jar")
        );
    }

    #[tokio::test]
    async fn test_local_repository_finds_artifact_files() {
        let temp = TempDir::new().unwrap();
        let coord = coordinate("org.example:lib:1.0");
        let path = LocalRepositoryResolver::artifact_path(temp.path(), &coord);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"jar").unwrap();

        let resolver = LocalRepositoryResolver::new(temp.path());
        let resolved = resolver.resolve(&coord, &[]).await.unwrap();
        assert_eq!(resolved.path, path);

        let missing = resolver.resolve(&coordinate("org.example:lib:2.0"), &[]).await;
        assert!(matches!(missing, Err(Error::UnresolvedDependency { .. })));
    }

    #[tokio::test]
    async fn test_local_repository_searches_file_repositories() {
        let primary = TempDir::new().unwrap();
        let extra = TempDir::new().unwrap();
        let coord = coordinate("tool:3.1");
        let path = LocalRepositoryResolver::artifact_path(extra.path(), &coord);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"jar").unwrap();

        let resolver = LocalRepositoryResolver::new(primary.path());
        assert!(resolver.resolve(&coord, &[]).await.is_err());

        let repositories = vec![
            "https://repo.example.org/maven".to_string(),
            format!("file://{}", extra.path().display()),
        ];
        let resolved = resolver.resolve(&coord, &repositories).await.unwrap();
        assert_eq!(resolved.path, path);
    }

    #[tokio::test]
    async fn test_compound_tries_resolvers_in_order() {
        let first = InMemoryResolver::new().with_artifact("a:1.0", "/first/a.jar");
        let second = InMemoryResolver::new()
            .with_artifact("a:1.0", "/second/a.jar")
            .with_artifact("b:1.0", "/second/b.jar");
        let compound = CompoundResolver::new()
            .with(Arc::new(first))
            .with(Arc::new(second));

        let a = compound.resolve(&coordinate("a:1.0"), &[]).await.unwrap();
        assert_eq!(a.path, PathBuf::from("/first/a.jar"));
        let b = compound.resolve(&coordinate("b:1.0"), &[]).await.unwrap();
        assert_eq!(b.path, PathBuf::from("/second/b.jar"));

        let err = compound.resolve(&coordinate("c:1.0"), &[]).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("c:1.0"), "got: {}", message);
        assert!(message.contains("in-memory"), "got: {}", message);
    }

    #[tokio::test]
    async fn test_empty_compound_reports_no_resolvers() {
        let err = CompoundResolver::new()
            .resolve(&coordinate("a:1.0"), &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no resolvers configured"));
    }

    #[tokio::test]
    async fn test_caching_resolver_only_caches_successes() {
        let counting = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
            inner: InMemoryResolver::new().with_artifact("a:1.0", "/a.jar"),
        });
        let caching = CachingResolver::new(counting.clone());

        caching.resolve(&coordinate("a:1.0"), &[]).await.unwrap();
        caching.resolve(&coordinate("a:1.0"), &[]).await.unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(caching.cached().await, 1);

        assert!(caching.resolve(&coordinate("b:1.0"), &[]).await.is_err());
        assert!(caching.resolve(&coordinate("b:1.0"), &[]).await.is_err());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
        assert_eq!(caching.cached().await, 1);
    }

    #[tokio::test]
    async fn test_caching_resolver_stays_within_capacity() {
        let mut inner = InMemoryResolver::new();
        for i in 0..50 {
            inner = inner.with_artifact(format!("lib{i}:1.0"), format!("/lib{i}.jar"));
        }
        let caching = CachingResolver::with_capacity(Arc::new(inner), 4);

        for i in 0..50 {
            let resolved = caching
                .resolve(&coordinate(&format!("lib{i}:1.0")), &[])
                .await
                .unwrap();
            assert_eq!(resolved.coordinate, format!("lib{i}:1.0"));
        }

        let cached = caching.cached().await;
        assert!(cached > 0);
        assert!(cached <= 4, "cached {cached} entries");
    }

    #[tokio::test]
    async fn test_caching_resolver_clear() {
        let caching = CachingResolver::new(Arc::new(
            InMemoryResolver::new().with_artifact("a:1.0", "/a.jar"),
        ));
        caching.resolve(&coordinate("a:1.0"), &[]).await.unwrap();
        assert_eq!(caching.cached().await, 1);

        caching.clear().await;
        assert_eq!(caching.cached().await, 0);
    }
}
