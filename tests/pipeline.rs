use mdnet::build::{build_site, Stage, Warning};
use mdnet::config::{self, GenerationConfig, Settings};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const POST_TEMPLATE: &str = r#"<title>{{.post.title}}</title>
{{if .post.date}}<time>{{.post.date}}</time>{{end}}
{{range .post.tags}}{{if .url}}<a href="{{.url}}">{{.name}}</a>{{else}}{{.name}}{{end}} {{end}}
{{.post.body}}
{{if .prev}}<a rel="prev" href="{{.prev.url}}">{{.prev.title}}</a>{{end}}
{{if .next}}<a rel="next" href="{{.next.url}}">{{.next.title}}</a>{{end}}
<a href="{{.index_url}}">home</a>"#;

const INDEX_TEMPLATE: &str =
    r#"{{range .posts}}<li>{{.date}} <a href="{{.url}}">{{.title}}</a></li>{{end}}"#;

const TAG_TEMPLATE: &str = r#"<h1>{{.tag_name}}</h1>{{range .posts}}<a href="{{.url}}">{{.title}}</a>{{end}}"#;

const ALL_TAGS_TEMPLATE: &str =
    r#"{{range .tags}}<a href="{{.url}}">{{.name}}</a> ({{len .posts}}){{end}}"#;

struct Site {
    dir: TempDir,
    config: GenerationConfig,
}

impl Site {
    fn new() -> Site {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts")).unwrap();
        fs::create_dir_all(root.join("theme")).unwrap();
        for (name, template) in [
            ("post.html", POST_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("tag.html", TAG_TEMPLATE),
            ("all_tags.html", ALL_TAGS_TEMPLATE),
        ] {
            fs::write(root.join("theme").join(name), template).unwrap();
        }
        let config = GenerationConfig {
            input_dir: root.join("posts"),
            output_dir: root.join("site"),
            post_template_path: root.join("theme/post.html"),
            index_template_path: root.join("theme/index.html"),
            tag_template_path: Some(root.join("theme/tag.html")),
            all_tags_template_path: Some(root.join("theme/all_tags.html")),
            all_posts_template_path: None,
            num_posts: 2,
            threads: None,
        };
        Site { dir, config }
    }

    fn post(&self, path: &str, contents: &str) -> &Site {
        let path = self.config.input_dir.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    fn output(&self, path: &str) -> String {
        fs::read_to_string(self.config.output_dir.join(path)).unwrap()
    }

    fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<(PathBuf, Vec<u8>)> = walkdir::WalkDir::new(&self.config.output_dir)
            .into_iter()
            .map(|entry| entry.unwrap())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| (entry.path().to_owned(), fs::read(entry.path()).unwrap()))
            .collect();
        files.sort();
        files
    }
}

fn frontmatter(title: &str, date: &str, tags: &str) -> String {
    format!(
        "---\ntitle: {}\ndate: {}\ntags: [{}]\n---\n",
        title, date, tags
    )
}

#[test]
fn index_shows_latest_posts() {
    let site = Site::new();
    site.post("first.md", &(frontmatter("First", "2023-01-01", "") + "one"))
        .post("second.md", &(frontmatter("Second", "2023-01-02", "") + "two"))
        .post("third.md", &(frontmatter("Third", "2023-01-03", "") + "three"));
    build_site(&site.config).unwrap();

    assert_eq!(
        concat!(
            r#"<li>2023-01-03 <a href="posts/third.html">Third</a></li>"#,
            r#"<li>2023-01-02 <a href="posts/second.html">Second</a></li>"#,
        ),
        site.output("index.html")
    );
    let second = site.output("posts/second.html");
    assert!(second.contains(r#"<a rel="prev" href="../posts/third.html">Third</a>"#));
    assert!(second.contains(r#"<a rel="next" href="../posts/first.html">First</a>"#));
    assert!(second.contains("<p>two</p>"));
    assert!(second.contains(r#"<a href="../index.html">home</a>"#));
}

#[test]
fn rebuilding_is_idempotent() {
    let site = Site::new();
    site.post("a.md", &(frontmatter("A", "2023-01-01", "rust, web") + "[b](b.md)"))
        .post("b.md", &(frontmatter("B", "2023-01-01", "Rust") + "b"))
        .post("notes/c.md", "undated");

    build_site(&site.config).unwrap();
    let first = site.snapshot();
    build_site(&site.config).unwrap();

    assert_eq!(first, site.snapshot());
    assert_eq!(
        vec![
            site.config.output_dir.join("all_tags.html"),
            site.config.output_dir.join("index.html"),
            site.config.output_dir.join("posts/a.html"),
            site.config.output_dir.join("posts/b.html"),
            site.config.output_dir.join("posts/c.html"),
            site.config.output_dir.join("tags/rust.html"),
            site.config.output_dir.join("tags/web.html"),
        ],
        first.into_iter().map(|(path, _)| path).collect::<Vec<_>>()
    );
    assert!(site.output("posts/a.html").contains(r#"<a href="b.html">b</a>"#));
}

#[test]
fn tags_are_merged_case_insensitively() {
    let site = Site::new();
    site.post("one.md", &(frontmatter("One", "2023-02-01", "Tutorial") + "1"))
        .post("two.md", &(frontmatter("Two", "2023-01-01", "tutorial") + "2"));

    build_site(&site.config).unwrap();

    assert_eq!(
        r#"<h1>Tutorial</h1><a href="../posts/one.html">One</a><a href="../posts/two.html">Two</a>"#,
        site.output("tags/tutorial.html")
    );
    assert_eq!(
        r#"<a href="tags/tutorial.html">Tutorial</a> (2)"#,
        site.output("all_tags.html")
    );
    let entries = fs::read_dir(site.config.output_dir.join("tags")).unwrap().count();
    assert_eq!(1, entries);
}

#[test]
fn punctuation_keeps_tags_apart() {
    let site = Site::new();
    site.post("a.md", &(frontmatter("A", "2023-01-01", "C") + "a"))
        .post("b.md", &(frontmatter("B", "2023-01-02", "C++") + "b"))
        .post("c.md", &(frontmatter("C", "2023-01-03", "\"C#\"") + "c"));

    // All three tags would be written to tags/c.html.
    let err = build_site(&site.config).unwrap_err();
    assert_eq!(Stage::Aggregating, err.stage);
    assert!(err.to_string().contains("tag page `c`"));
    assert!(!site.config.output_dir.exists());

    let names = site.dir.path().join("theme/tag_names.html");
    fs::write(&names, "{{range .tags}}{{.name}}={{len .posts}};{{end}}").unwrap();
    let config = GenerationConfig {
        tag_template_path: None,
        all_tags_template_path: Some(names),
        ..site.config.clone()
    };
    build_site(&config).unwrap();
    assert_eq!("C=1;C#=1;C++=1;", site.output("all_tags.html"));
}

#[test]
fn slug_collision_aborts_before_writing() {
    let site = Site::new();
    site.post("My Post.md", "one").post("my-post.md", "two");

    let err = build_site(&site.config).unwrap_err();

    assert_eq!(Stage::Parsing, err.stage);
    assert!(err.to_string().contains("my-post"));
    assert!(!site.config.output_dir.exists());
}

#[test]
fn template_errors_abort_before_writing() {
    let site = Site::new();
    site.post("a.md", &(frontmatter("A", "2023-01-01", "rust") + "a"));

    let missing = GenerationConfig {
        tag_template_path: Some(site.dir.path().join("theme/missing.html")),
        ..site.config.clone()
    };
    let err = build_site(&missing).unwrap_err();
    assert_eq!(Stage::Rendering, err.stage);
    assert!(err.to_string().contains("missing.html"));
    assert!(!site.config.output_dir.exists());

    fs::write(site.dir.path().join("theme/broken.html"), "{{if .posts}}").unwrap();
    let broken = GenerationConfig {
        index_template_path: site.dir.path().join("theme/broken.html"),
        ..site.config.clone()
    };
    let err = build_site(&broken).unwrap_err();
    assert_eq!(Stage::Rendering, err.stage);
    assert!(!site.config.output_dir.exists());
}

#[test]
fn missing_input_directory() {
    let site = Site::new();
    let config = GenerationConfig {
        input_dir: site.dir.path().join("nope"),
        ..site.config.clone()
    };
    let err = build_site(&config).unwrap_err();
    assert_eq!(Stage::Discovering, err.stage);
}

#[test]
fn warnings_do_not_stop_the_build() {
    let site = Site::new();
    site.post("a.md", "---\ntitle: [oops\n---\nsee [gone](gone.md)\n");

    let report = build_site(&site.config).unwrap();

    assert_eq!(1, report.posts);
    assert_eq!(2, report.warnings.len());
    assert!(matches!(report.warnings[0], Warning::Metadata { .. }));
    assert_eq!(
        Warning::DanglingLink {
            path: site.config.input_dir.join("a.md"),
            slug: String::from("gone"),
        },
        report.warnings[1]
    );
    // The title falls back to the file stem and the body still renders.
    let page = site.output("posts/a.html");
    assert!(page.starts_with("<title>a</title>"));
    assert!(page.contains(r#"<a href="gone.html">gone</a>"#));
}

#[test]
fn config_file_paths_are_relative_to_the_file() {
    let site = Site::new();
    site.post("a.md", "a");
    let root = site.dir.path();
    let config_path = root.join("config.yaml");
    fs::write(
        &config_path,
        "input_dir: posts\noutput_dir: site\npost_template_path: theme/post.html\nindex_template_path: theme/index.html\nnum_posts: 5\n",
    )
    .unwrap();

    let cli = Settings {
        num_posts: Some(1),
        ..Settings::default()
    };
    let file = Settings::load(Some(&config_path)).unwrap();
    let config = config::resolve(cli, file).unwrap();

    assert_eq!(1, config.num_posts);
    assert_eq!(root.join("posts"), config.input_dir);
    assert_eq!(None, config.tag_template_path);
    build_site(&config).unwrap();
    assert!(root.join("site/posts/a.html").is_file());
    assert!(!root.join("site/tags").exists());
}
