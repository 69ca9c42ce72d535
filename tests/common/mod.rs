#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    static TEMP_LOCK: Mutex<()> = Mutex::new(());

    /// Creates a temporary file with a unique name and the given extension
    pub fn create_temp_file(content: &str, ext: &str) -> PathBuf {
        let _lock = TEMP_LOCK.lock().unwrap();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "brrtmvc_test_{}_{}_{}.{}",
            std::process::id(),
            counter,
            nanos,
            ext
        ));

        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_file(content, "yaml")
    }

    pub fn create_temp_toml(content: &str) -> PathBuf {
        create_temp_file(content, "toml")
    }

    pub fn create_temp_json(content: &str) -> PathBuf {
        create_temp_file(content, "json")
    }

    /// Cleanup temporary files (best effort)
    pub fn cleanup_temp_files(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub mod fixtures {
    /// Manifest shared by the integration tests
    pub const BLOG_MANIFEST: &str = r#"
placeholders:
  slug: '[a-z0-9-]+'
routes:
  - { verb: get, from: '/', to: 'Home::index', name: home }
  - { verb: get, from: 'books/(:num)/(:alpha)/(:num)', to: 'Blog::show/$3/$1', name: books.show }
  - { verb: get, from: 'posts/(:slug)', to: 'Posts::view/$1' }
  - { verb: get, from: '{locale}/about', to: 'Pages::about' }
resources:
  - { name: photos, except: [new, edit] }
groups:
  - prefix: admin
    namespace: 'App\Controllers\Admin'
    middleware: [session]
    routes:
      - { verb: get, from: users, to: 'Users::index', middleware: [csrf] }
      - { verb: get, from: 'users/(:num)', to: 'Users::show/$1', name: admin.user }
redirects:
  - { from: 'old-home', to: home, status: 301 }
"#;
}
