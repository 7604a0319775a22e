#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use misdirect::prelude::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            site_host: Some("example.com".to_string()),
            ..SiteConfig::default()
        }
    }

    fn simple_rule(mapped: &str, redirect: &str) -> MappingRule {
        MappingRuleBuilder::default()
            .mapped_link(mapped)
            .redirect_link(redirect)
            .build()
            .unwrap()
    }

    async fn engine_with(
        rules: Vec<MappingRule>,
    ) -> (
        MisdirectionEngine,
        Arc<InMemoryMappingStore>,
        Arc<InMemoryPageTree>,
    ) {
        let config = test_config();
        let store = Arc::new(InMemoryMappingStore::new());
        for rule in rules {
            store.create(rule).await.unwrap();
        }
        let pages = Arc::new(InMemoryPageTree::new(&config));
        let engine =
            MisdirectionEngine::new(store.clone(), pages.clone(), config);
        (engine, store, pages)
    }

    #[tokio::test]
    async fn test_simple_mapping_is_single_hop() {
        let (engine, _, _) = engine_with(vec![
            simple_rule("wrong/page", "pending"),
            simple_rule("pending", "correct/page"),
        ])
        .await;

        // The engine never chains; the first hop is the result.
        let target = engine.resolve("wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/pending");
        assert_eq!(target.response_code, 303);
        assert_eq!(target.target_host, None);
        assert!(!target.forward_post);

        // Chaining is the caller re-invoking on the new target.
        let target = engine.resolve("pending", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/correct/page");
    }

    #[tokio::test]
    async fn test_regex_mapping() {
        let rule = MappingRuleBuilder::default()
            .link_type(LinkType::Regex)
            .mapped_link("^wrong/page$")
            .redirect_link("correct/page")
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        let target = engine.resolve("wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/correct/page");
        assert_eq!(target.response_code, 303);
    }

    #[tokio::test]
    async fn test_regex_capture_substitution() {
        let rule = MappingRuleBuilder::default()
            .link_type(LinkType::Regex)
            .mapped_link(r"^news/(\d+)$")
            .redirect_link("articles/$1")
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        let target = engine.resolve("news/42", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/articles/42");
    }

    #[tokio::test]
    async fn test_regex_match_is_unanchored_substring() {
        let rule = MappingRuleBuilder::default()
            .link_type(LinkType::Regex)
            .mapped_link("wrong")
            .redirect_link("fixed")
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        // The pattern replaces within the requested path, the surrounding
        // segments survive.
        let target =
            engine.resolve("very/wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/very/fixed/page");
    }

    #[tokio::test]
    async fn test_priority_wins_over_recency() {
        let mut low = simple_rule("wrong/page", "low");
        low.priority = 1;
        let mut high = simple_rule("wrong/page", "high");
        high.priority = 5;

        // The high-priority rule is created first, so recency would pick
        // the other one.
        let (engine, _, _) = engine_with(vec![high, low]).await;

        let target = engine.resolve("wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/high");
    }

    #[tokio::test]
    async fn test_recency_breaks_priority_ties() {
        let (engine, _, _) = engine_with(vec![
            simple_rule("wrong/page", "older"),
            simple_rule("wrong/page", "newer"),
        ])
        .await;

        let target = engine.resolve("wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/newer");
    }

    #[tokio::test]
    async fn test_no_match_returns_none() {
        let (engine, _, _) =
            engine_with(vec![simple_rule("wrong/page", "pending")]).await;

        let target = engine.resolve("unmapped/path", None).await.unwrap();
        assert_eq!(target, None);
    }

    #[tokio::test]
    async fn test_simple_match_is_case_insensitive() {
        let (engine, _, _) =
            engine_with(vec![simple_rule("Wrong/Page", "pending")]).await;

        let target = engine.resolve("wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/pending");
    }

    #[tokio::test]
    async fn test_absolute_local_request_is_unified() {
        let (engine, _, _) =
            engine_with(vec![simple_rule("wrong/page", "pending")]).await;

        let target = engine
            .resolve("https://example.com/wrong/page/", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target.target_url, "/pending");
    }

    #[tokio::test]
    async fn test_external_redirect_passes_through() {
        let (engine, _, _) = engine_with(vec![simple_rule(
            "partners",
            "https://other.example.net/landing",
        )])
        .await;

        let target = engine.resolve("partners", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "https://other.example.net/landing");
        assert_eq!(
            target.target_host,
            Some("other.example.net".to_string())
        );
    }

    #[tokio::test]
    async fn test_page_rule_resolves_current_link() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("old-team")
            .redirect_type(RedirectType::Page)
            .redirect_page_id(3u64)
            .build()
            .unwrap();
        let (engine, _, pages) = engine_with(vec![rule]).await;
        pages.insert(2, None, "about-us", "About Us");
        pages.insert(3, Some(2), "team", "Team");

        let target = engine.resolve("old-team", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/about-us/team/");
        assert_eq!(target.target_host, None);
    }

    #[tokio::test]
    async fn test_home_page_normalization() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("old-home")
            .redirect_type(RedirectType::Page)
            .redirect_page_id(1u64)
            .build()
            .unwrap();
        let (engine, _, pages) = engine_with(vec![rule]).await;
        pages.insert(1, None, "home", "Home");

        // Never the bare base path.
        let target = engine.resolve("old-home", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/home/");
    }

    #[tokio::test]
    async fn test_missing_page_falls_through_to_next_candidate() {
        let mut orphan = MappingRuleBuilder::default()
            .mapped_link("gone")
            .redirect_type(RedirectType::Page)
            .redirect_page_id(99u64)
            .build()
            .unwrap();
        orphan.priority = 5;
        let fallback = simple_rule("gone", "fallback");
        let (engine, _, _) = engine_with(vec![orphan, fallback]).await;

        let target = engine.resolve("gone", None).await.unwrap().unwrap();
        assert_eq!(target.target_url, "/fallback");
    }

    #[tokio::test]
    async fn test_trashed_page_is_a_soft_non_match() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("old-team")
            .redirect_type(RedirectType::Page)
            .redirect_page_id(3u64)
            .build()
            .unwrap();
        let (engine, _, pages) = engine_with(vec![rule]).await;
        pages.insert(3, None, "team", "Team");
        pages.trash(3);

        assert_eq!(engine.resolve("old-team", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_substitution_is_a_soft_non_match() {
        let rule = MappingRuleBuilder::default()
            .link_type(LinkType::Regex)
            .mapped_link("^gone/.*$")
            .redirect_link("")
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        assert_eq!(engine.resolve("gone/page", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_stored_pattern_surfaces() {
        // Built by hand; the builder would have rejected the pattern.
        let broken = MappingRule {
            link_type: LinkType::Regex,
            mapped_link: "^wrong/(page$".to_string(),
            redirect_link: "pending".to_string(),
            ..MappingRule::default()
        };
        let (engine, _, _) = engine_with(vec![broken]).await;

        match engine.resolve("wrong/page", None).await {
            Err(MisdirectionError::InvalidPattern { pattern, .. }) => {
                assert_eq!(pattern, "^wrong/(page$");
            }
            other => panic!("Expected InvalidPattern, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stored_response_code_outside_range_falls_back() {
        // Built by hand; stored data predating validation.
        let stale = MappingRule {
            mapped_link: "wrong/page".to_string(),
            redirect_link: "pending".to_string(),
            response_code: 200,
            ..MappingRule::default()
        };
        let (engine, _, _) = engine_with(vec![stale]).await;

        let target = engine.resolve("wrong/page", None).await.unwrap().unwrap();
        assert_eq!(target.response_code, 303);
    }

    #[tokio::test]
    async fn test_forward_post_flag_is_surfaced() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("submit/old")
            .redirect_link("submit/new")
            .forward_post_request(true)
            .response_code(307u16)
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        let target = engine.resolve("submit/old", None).await.unwrap().unwrap();
        assert!(target.forward_post);
        assert_eq!(target.response_code, 307);
    }

    #[tokio::test]
    async fn test_hostname_restriction_scopes_matching() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("wrong/page")
            .redirect_link("pending")
            .hostname_restriction("legacy.example.com".to_string())
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        assert_eq!(engine.resolve("wrong/page", None).await.unwrap(), None);
        assert_eq!(
            engine
                .resolve("wrong/page", Some("www.example.com"))
                .await
                .unwrap(),
            None
        );

        let target = engine
            .resolve("wrong/page", Some("Legacy.Example.Com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target.target_url, "/pending");
    }

    #[tokio::test]
    async fn test_includes_hostname_matches_host_and_path() {
        let rule = MappingRuleBuilder::default()
            .mapped_link("example.com/old")
            .includes_hostname(true)
            .redirect_link("new")
            .build()
            .unwrap();
        let (engine, _, _) = engine_with(vec![rule]).await;

        let target = engine
            .resolve("old", Some("example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target.target_url, "/new");

        // Without a request hostname the rule cannot apply.
        assert_eq!(engine.resolve("old", None).await.unwrap(), None);
        assert_eq!(
            engine.resolve("old", Some("other.example.net")).await.unwrap(),
            None
        );
    }
}
