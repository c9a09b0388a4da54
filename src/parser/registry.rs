use super::{A2aParser, ConventionParser, HtParser, ParseOptions, Parsed, ReceptorParser, SparcParser};
use crate::convention::{self, NamingConvention};
use crate::error::{NormalizeError, UnrecognizedFormatError};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Dispatch table from naming convention to extraction strategy
pub struct ParserRegistry {
    /// Convention -> Parser mapping
    map: HashMap<NamingConvention, Box<dyn ConventionParser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Registry with every built-in convention strategy
    pub fn with_builtin(options: ParseOptions) -> Self {
        let mut registry = Self::new();
        registry.register(SparcParser);
        registry.register(HtParser::new(options.clone()));
        registry.register(ReceptorParser::ht2a(options.clone()));
        registry.register(ReceptorParser::ht2b(options.clone()));
        registry.register(ReceptorParser::ht7(options.clone()));
        registry.register(A2aParser::new(options));
        registry
    }

    /// Register a parser under the convention it reports, replacing any
    /// earlier parser for that convention
    ///
    /// # Example
    /// ```ignore
    /// registry.register(SparcParser);
    /// registry.register(ReceptorParser::ht7(options));
    /// ```
    pub fn register(&mut self, parser: impl ConventionParser + 'static) {
        self.map.insert(parser.convention(), Box::new(parser));
    }

    /// Select the parser for a convention. `Unknown` never has one.
    pub fn select(&self, convention: NamingConvention) -> Option<&dyn ConventionParser> {
        if !convention.is_known() {
            return None;
        }
        self.map.get(&convention).map(|p| &**p)
    }

    /// Parse `path` with the strategy for an already-known convention
    pub fn parse_as(
        &self,
        path: &str,
        convention: NamingConvention,
        modified: NaiveDate,
    ) -> Result<Parsed, NormalizeError> {
        let parser = self.select(convention).ok_or_else(|| UnrecognizedFormatError {
            path: path.to_string(),
        })?;
        Ok(parser.parse(path, modified)?)
    }

    /// Classify `path`, then parse it with the matching strategy
    pub fn parse(&self, path: &str, modified: NaiveDate) -> Result<Parsed, NormalizeError> {
        self.parse_as(path, convention::classify(path), modified)
    }

    /// Get the number of registered parsers
    pub fn parser_count(&self) -> usize {
        self.map.len()
    }

    /// List registered conventions in declaration order
    pub fn registered_conventions(&self) -> Vec<NamingConvention> {
        let mut conventions: Vec<NamingConvention> = self.map.keys().copied().collect();
        conventions.sort();
        conventions
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_builtin(ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_has_no_parser() {
        let registry = ParserRegistry::default();
        assert!(registry.select(NamingConvention::Unknown).is_none());
    }

    #[test]
    fn test_builtin_covers_every_known_convention() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.parser_count(), 6);
        for convention in NamingConvention::ALL.iter().filter(|c| c.is_known()) {
            let parser = registry.select(*convention).unwrap();
            assert_eq!(parser.convention(), *convention);
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ParserRegistry::new();
        assert_eq!(registry.parser_count(), 0);
        registry.register(SparcParser);
        registry.register(SparcParser);
        assert_eq!(registry.parser_count(), 1);
        assert_eq!(registry.registered_conventions(), vec![NamingConvention::Sparc]);
    }

    #[test]
    fn test_empty_registry_reports_unrecognized() {
        let registry = ParserRegistry::new();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let err = registry
            .parse("/d/sam-1_spec-x_lat-left_stain-a_sec-1_mag-2x.tif", date)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Unrecognized(_)));
    }
}
