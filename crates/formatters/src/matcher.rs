//! Type name matching and the formatter table.
//!
//! The table is an explicit value owned by whoever drives formatting; there is no
//! process-wide registry. Entries are consulted in registration order and the first
//! match wins.

/// Matching policy for a runtime type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNameMatcher {
	/// Exact name equality.
	Full(String),
	/// Name starts with the prefix.
	Prefix(String),
}

impl TypeNameMatcher {
	pub fn matches(&self, type_name: &str) -> bool {
		match self {
			Self::Full(name) => type_name == name,
			Self::Prefix(prefix) => type_name.starts_with(prefix.as_str()),
		}
	}
}

#[derive(Debug, Clone)]
struct Entry<F> {
	language: String,
	matcher: TypeNameMatcher,
	formatter: F,
}

/// Ordered `(language, matcher, formatter)` entries.
#[derive(Debug, Clone)]
pub struct FormatterTable<F> {
	entries: Vec<Entry<F>>,
}

impl<F> Default for FormatterTable<F> {
	fn default() -> Self {
		Self { entries: Vec::new() }
	}
}

impl<F> FormatterTable<F> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `formatter` for type names starting with `prefix`.
	pub fn add_prefix(&mut self, language: impl Into<String>, prefix: impl Into<String>, formatter: F) -> &mut Self {
		self.push(language.into(), TypeNameMatcher::Prefix(prefix.into()), formatter)
	}

	/// Registers `formatter` for exactly `name`.
	pub fn add_full(&mut self, language: impl Into<String>, name: impl Into<String>, formatter: F) -> &mut Self {
		self.push(language.into(), TypeNameMatcher::Full(name.into()), formatter)
	}

	fn push(&mut self, language: String, matcher: TypeNameMatcher, formatter: F) -> &mut Self {
		self.entries.push(Entry {
			language,
			matcher,
			formatter,
		});
		self
	}

	/// First formatter whose matcher accepts `type_name`.
	pub fn lookup(&self, type_name: &str) -> Option<&F> {
		self.entries
			.iter()
			.find(|entry| entry.matcher.matches(type_name))
			.map(|entry| &entry.formatter)
	}

	/// Drops every entry registered under `language`.
	pub fn remove_language(&mut self, language: &str) {
		self.entries.retain(|entry| entry.language != language);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<F: Clone> FormatterTable<F> {
	/// Like [`lookup`](Self::lookup), returning `fallback` when nothing matches.
	pub fn find(&self, type_name: &str, fallback: F) -> F {
		self.lookup(type_name).cloned().unwrap_or(fallback)
	}
}
