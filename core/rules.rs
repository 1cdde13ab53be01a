use crate::config::Config;
use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::Gitignore;
use log;
use std::ffi::OsStr;
use std::path::Path;

pub mod gitignore;

/// A path seen during collection, as presented to the rules.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub path: &'a Path,
    /// Base name; patterns never see the rest of the path.
    pub name: &'a OsStr,
    pub is_dir: bool,
}

impl<'a> Candidate<'a> {
    pub fn new(path: &'a Path, is_dir: bool) -> Self {
        Self {
            path,
            name: path.file_name().unwrap_or(path.as_os_str()),
            is_dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamePatternRule {
    include: bool,
    patterns: Vec<String>,
    set: GlobSet,
}

impl NamePatternRule {
    pub fn new(include: bool, patterns: Vec<String>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    log::error!("Invalid glob pattern \"{}\": {}", pattern, e);
                    AppError::Glob {
                        pattern: pattern.clone(),
                        message: e.kind().to_string(),
                    }
                })?;
            log::trace!("Adding glob pattern: {}", pattern);
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| AppError::Glob {
            pattern: patterns.join(","),
            message: e.to_string(),
        })?;
        Ok(Self {
            include,
            patterns,
            set,
        })
    }

    /// Parses a comma-separated pattern string such as `"*.html", '*.css'`.
    pub fn from_pattern_list(include: bool, patterns: &str) -> Result<Self> {
        Self::new(include, parse_pattern_list(patterns))
    }

    pub fn include(&self) -> bool {
        self.include
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn test(&self, candidate: &Candidate<'_>) -> bool {
        if candidate.is_dir {
            return true;
        }
        if self.set.is_match(Path::new(candidate.name)) {
            self.include
        } else {
            !self.include
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitignoreRule {
    matcher: Gitignore,
}

impl GitignoreRule {
    pub fn new(matcher: Gitignore) -> Self {
        Self { matcher }
    }

    pub fn source(&self) -> &Path {
        self.matcher.path()
    }

    pub fn test(&self, candidate: &Candidate<'_>) -> bool {
        !self
            .matcher
            .matched(Path::new(candidate.name), candidate.is_dir)
            .is_ignore()
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    NamePattern(NamePatternRule),
    Gitignore(GitignoreRule),
}

impl Rule {
    pub fn test(&self, candidate: &Candidate<'_>) -> bool {
        match self {
            Rule::NamePattern(rule) => rule.test(candidate),
            Rule::Gitignore(rule) => rule.test(candidate),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Passes only if every rule passes. Stops at the first failing rule.
    pub fn test(&self, candidate: &Candidate<'_>, verbose: bool) -> bool {
        for rule in &self.rules {
            if !rule.test(candidate) {
                if verbose {
                    log::info!("ignoring {}", candidate.path.display());
                } else {
                    log::trace!("ignoring {}", candidate.path.display());
                }
                return false;
            }
        }
        true
    }
}

/// Splits on commas and strips whitespace and quotes from each token.
pub fn parse_pattern_list(patterns: &str) -> Vec<String> {
    patterns
        .split(',')
        .map(|p| p.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\''))
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Builds the rule set for one run. Gitignore files are discovered under
/// `work_dir`, not under the inputs.
pub fn build_rules(config: &Config, work_dir: &Path) -> Result<RuleSet> {
    let mut rules = RuleSet::default();

    if let Some(include) = config.effective_include() {
        log::debug!("Using include patterns: {}", include);
        rules.push(Rule::NamePattern(NamePatternRule::from_pattern_list(
            true, include,
        )?));
    } else if let Some(exclude) = config.effective_exclude() {
        log::debug!("Using exclude patterns: {}", exclude);
        rules.push(Rule::NamePattern(NamePatternRule::from_pattern_list(
            false, exclude,
        )?));
    }

    if config.input.use_gitignore {
        for matcher in gitignore::discover_gitignores(work_dir)? {
            rules.push(Rule::Gitignore(GitignoreRule::new(matcher)));
        }
    }

    log::debug!("Built {} filter rules.", rules.len());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn file(path: &str) -> Candidate<'_> {
        Candidate::new(Path::new(path), false)
    }

    fn dir(path: &str) -> Candidate<'_> {
        Candidate::new(Path::new(path), true)
    }

    #[test]
    fn test_parse_pattern_list() {
        assert_eq!(
            parse_pattern_list(r#" "*.html", '*.css' ,*.js,, "#),
            vec!["*.html", "*.css", "*.js"]
        );
        assert!(parse_pattern_list("").is_empty());
    }

    #[test]
    fn test_include_rule() {
        let rule = NamePatternRule::from_pattern_list(true, "*.txt,data?.bin").unwrap();
        assert!(rule.test(&file("docs/a.txt")));
        assert!(rule.test(&file("data1.bin")));
        assert!(!rule.test(&file("data10.bin")));
        assert!(!rule.test(&file("b.log")));
    }

    #[test]
    fn test_exclude_rule() {
        let rule = NamePatternRule::from_pattern_list(false, "*.log").unwrap();
        assert!(rule.test(&file("a.txt")));
        assert!(!rule.test(&file("dir/b.log")));
    }

    #[test]
    fn test_patterns_match_base_name_only() {
        let rule = NamePatternRule::from_pattern_list(true, "sub*").unwrap();
        assert!(!rule.test(&file("sub/c.txt")));
        assert!(rule.test(&file("other/sub.txt")));
    }

    #[test]
    fn test_character_class() {
        let rule = NamePatternRule::from_pattern_list(true, "[ab].txt").unwrap();
        assert!(rule.test(&file("a.txt")));
        assert!(!rule.test(&file("c.txt")));
    }

    #[test]
    fn test_directories_always_pass_name_rules() {
        let include = NamePatternRule::from_pattern_list(true, "*.txt").unwrap();
        let exclude = NamePatternRule::from_pattern_list(false, "*").unwrap();
        assert!(include.test(&dir("assets")));
        assert!(exclude.test(&dir("assets")));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let err = NamePatternRule::from_pattern_list(true, "*.txt,[abc").unwrap_err();
        match &err {
            AppError::Glob { pattern, .. } => assert_eq!(pattern, "[abc"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rule_set_is_conjunction() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "secret.txt\n").unwrap();
        let matcher = gitignore::compile_gitignore(&dir.path().join(".gitignore")).unwrap();

        let rules = RuleSet::new(vec![
            Rule::NamePattern(NamePatternRule::from_pattern_list(true, "*.txt").unwrap()),
            Rule::Gitignore(GitignoreRule::new(matcher)),
        ]);
        assert!(rules.test(&file("a.txt"), false));
        assert!(!rules.test(&file("a.log"), false));
        assert!(!rules.test(&file("secret.txt"), true));
        assert!(RuleSet::default().test(&file("anything"), false));
    }

    #[test]
    fn test_rejections_logged_by_verbosity() {
        crate::test_log::init();
        let rules = RuleSet::new(vec![Rule::NamePattern(
            NamePatternRule::from_pattern_list(false, "*.log").unwrap(),
        )]);

        assert!(!rules.test(&file("verbose-run/drop.log"), true));
        assert!(crate::test_log::logged(
            log::Level::Info,
            "ignoring verbose-run/drop.log"
        ));

        assert!(!rules.test(&file("quiet-run/drop.log"), false));
        assert!(crate::test_log::logged(
            log::Level::Trace,
            "ignoring quiet-run/drop.log"
        ));
        assert!(!crate::test_log::logged(
            log::Level::Info,
            "ignoring quiet-run/drop.log"
        ));
    }

    #[test]
    fn test_gitignore_rule_negation() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.tmp\n!keep.tmp\n").unwrap();
        let matcher = gitignore::compile_gitignore(&dir.path().join(".gitignore")).unwrap();
        let rule = GitignoreRule::new(matcher);
        assert!(!rule.test(&file("deep/x.tmp")));
        assert!(rule.test(&file("keep.tmp")));
        assert!(rule.test(&file("x.go")));
    }

    #[test]
    fn test_build_rules_include_wins() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.input.include = Some("*.html".to_string());
        config.input.exclude = Some("*.css".to_string());

        let rules = build_rules(&config, dir.path()).unwrap();
        assert_eq!(rules.len(), 1);
        match &rules.rules()[0] {
            Rule::NamePattern(rule) => {
                assert!(rule.include());
                assert_eq!(rule.patterns(), ["*.html"]);
            }
            other => panic!("unexpected rule: {other:?}"),
        }
    }

    #[test]
    fn test_build_rules_exclude_and_gitignores() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("web")).unwrap();
        fs::write(dir.path().join(".gitignore"), "*.tmp\n").unwrap();
        fs::write(dir.path().join("web/.gitignore"), "*.bak\n").unwrap();

        let mut config = Config::default();
        config.input.exclude = Some("*.log".to_string());
        config.input.use_gitignore = true;

        let rules = build_rules(&config, dir.path()).unwrap();
        assert_eq!(rules.len(), 3);
        assert!(matches!(&rules.rules()[0], Rule::NamePattern(r) if !r.include()));
        let sources: Vec<PathBuf> = rules.rules()[1..]
            .iter()
            .map(|r| match r {
                Rule::Gitignore(g) => g.source().to_path_buf(),
                other => panic!("unexpected rule: {other:?}"),
            })
            .collect();
        assert_eq!(
            sources,
            vec![dir.path().to_path_buf(), dir.path().join("web")]
        );
    }

    #[test]
    fn test_build_rules_empty_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.tmp\n").unwrap();
        let rules = build_rules(&Config::default(), dir.path()).unwrap();
        assert!(rules.is_empty());
    }
}
