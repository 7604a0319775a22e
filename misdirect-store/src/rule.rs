use derive_builder::Builder;
use misdirect_urls::is_external_url;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Assigned by the store on create; higher means created later, and recency
/// is the tie-break between rules of equal priority.
pub type RuleId = u64;

/// Identifier of a page resource owned by the page-tree collaborator.
pub type PageId = u64;

/// Response code used when a rule carries none, or an out-of-range one.
pub const DEFAULT_RESPONSE_CODE: u16 = 303;

/// How a rule's mapped link is matched against the requested path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkType {
    /// Exact match, case-insensitive after unification.
    #[default]
    Simple,
    /// Case-insensitive, unanchored pattern match.
    Regex,
}

/// What a rule redirects to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectType {
    /// The literal `redirect_link`.
    #[default]
    Link,
    /// The page behind `redirect_page_id`, resolved at request time.
    Page,
}

/// A stored redirect directive matching a path pattern to a target.
///
/// Rules are authored through [`MappingRuleBuilder`], which enforces the
/// invariants a stored rule is expected to hold: the response code sits in
/// the redirect range, a regex pattern compiles, and page redirects name a
/// page. Hand-constructed rules bypass those checks; resolution copes with
/// out-of-range response codes (falling back to 303) but surfaces broken
/// patterns loudly.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[builder(public, setter(into), build_fn(validate = "Self::validate"))]
pub struct MappingRule {
    #[builder(default)]
    pub id: RuleId,
    #[builder(default)]
    pub link_type: LinkType,
    /// The literal path or pattern body to match; never carries a scheme.
    pub mapped_link: String,
    /// When set, matching runs against `"{hostname}/{path}"`.
    #[builder(default)]
    pub includes_hostname: bool,
    /// 1-10 user-assigned, 0 means unset; higher wins.
    #[builder(default)]
    pub priority: i32,
    #[builder(default)]
    pub redirect_type: RedirectType,
    /// May carry `$1`-style capture references when `link_type` is `Regex`.
    #[builder(default)]
    pub redirect_link: String,
    #[builder(default)]
    pub redirect_page_id: Option<PageId>,
    #[builder(default = "DEFAULT_RESPONSE_CODE")]
    pub response_code: u16,
    /// Surfaced in the resolved target; consumed by the transport layer.
    #[builder(default)]
    pub forward_post_request: bool,
    /// Legacy scoping, superseded by `includes_hostname`. When present the
    /// request hostname must equal it.
    #[builder(default)]
    pub hostname_restriction: Option<String>,
    /// Authoring-time only: require `redirect_link` to be a well-formed
    /// external URL.
    #[builder(default)]
    pub validate_external: bool,
}

impl MappingRule {
    /// The stored response code when it sits in the redirect range, 303
    /// otherwise.
    pub fn effective_response_code(&self) -> u16 {
        if (300..400).contains(&self.response_code) {
            self.response_code
        } else {
            DEFAULT_RESPONSE_CODE
        }
    }
}

impl Default for MappingRule {
    fn default() -> Self {
        Self {
            id: 0,
            link_type: LinkType::Simple,
            mapped_link: String::new(),
            includes_hostname: false,
            priority: 0,
            redirect_type: RedirectType::Link,
            redirect_link: String::new(),
            redirect_page_id: None,
            response_code: DEFAULT_RESPONSE_CODE,
            forward_post_request: false,
            hostname_restriction: None,
            validate_external: false,
        }
    }
}

impl MappingRuleBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(code) = self.response_code {
            if !(300..400).contains(&code) {
                return Err(format!(
                    "response code {code} is outside the redirect range"
                ));
            }
        }
        if let Some(priority) = self.priority {
            if !(0..=10).contains(&priority) {
                return Err(format!("priority {priority} is outside 0..=10"));
            }
        }
        if self.link_type == Some(LinkType::Regex) {
            let pattern = self.mapped_link.as_deref().unwrap_or_default();
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| format!("mapped pattern does not compile: {err}"))?;
        }
        if self.redirect_type == Some(RedirectType::Page)
            && !matches!(self.redirect_page_id, Some(Some(_)))
        {
            return Err("page redirects require a redirect page id".to_string());
        }
        if self.validate_external == Some(true) {
            if let Some(link) = self.redirect_link.as_deref() {
                if !link.is_empty() && !is_external_url(link) {
                    return Err(format!(
                        "external URL validation failed for {link:?}"
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .redirect_link("pending")
            .build()
            .unwrap();

        assert_eq!(rule.link_type, LinkType::Simple);
        assert_eq!(rule.redirect_type, RedirectType::Link);
        assert_eq!(rule.response_code, 303);
        assert_eq!(rule.priority, 0);
        assert!(!rule.forward_post_request);
    }

    #[test]
    fn test_builder_rejects_non_redirect_response_code() {
        let result = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .response_code(200u16)
            .build();
        assert!(result.is_err());

        let result = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .response_code(400u16)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_out_of_range_priority() {
        let result = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .priority(11)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_broken_pattern() {
        let result = MappingRuleBuilder::default()
            .link_type(LinkType::Regex)
            .mapped_link("^wrong/(page$")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_page_id_for_page_redirects() {
        let result = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .redirect_type(RedirectType::Page)
            .build();
        assert!(result.is_err());

        let rule = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .redirect_type(RedirectType::Page)
            .redirect_page_id(7u64)
            .build()
            .unwrap();
        assert_eq!(rule.redirect_page_id, Some(7));
    }

    #[test]
    fn test_builder_external_validation() {
        let result = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .redirect_link("not/an/external/url")
            .validate_external(true)
            .build();
        assert!(result.is_err());

        let rule = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .redirect_link("https://other.example.net/landing")
            .validate_external(true)
            .build()
            .unwrap();
        assert_eq!(rule.redirect_link, "https://other.example.net/landing");
    }

    #[test]
    fn test_effective_response_code_falls_back() {
        let rule = MappingRule {
            response_code: 200,
            ..MappingRule::default()
        };
        assert_eq!(rule.effective_response_code(), 303);

        let rule = MappingRule {
            response_code: 301,
            ..MappingRule::default()
        };
        assert_eq!(rule.effective_response_code(), 301);
    }
}
