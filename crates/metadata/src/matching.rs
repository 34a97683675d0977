//! Disambiguation among search results.

use artutils_core::{Candidate, Selector};

use crate::provider::SearchResult;

pub fn normalize_title_for_match(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Exact title and year, then exact title, then year, then the first result.
pub fn pick_best_match<'a>(
    title: &str,
    year: Option<i32>,
    results: &'a [SearchResult],
) -> Option<&'a SearchResult> {
    if results.is_empty() {
        return None;
    }

    let normalized = normalize_title_for_match(title);

    if let Some(year) = year {
        if let Some(hit) = results
            .iter()
            .find(|hit| normalize_title_for_match(&hit.title) == normalized && hit.year == Some(year))
        {
            return Some(hit);
        }
    }

    if let Some(hit) = results
        .iter()
        .find(|hit| normalize_title_for_match(&hit.title) == normalized)
    {
        return Some(hit);
    }

    if let Some(year) = year {
        if let Some(hit) = results.iter().find(|hit| hit.year == Some(year)) {
            return Some(hit);
        }
    }

    results.first()
}

/// Automatic best match, or the user's pick when a selector is given.
pub fn choose<'a>(
    title: &str,
    year: Option<i32>,
    results: &'a [SearchResult],
    selector: Option<&dyn Selector>,
) -> Option<&'a SearchResult> {
    let Some(selector) = selector else {
        return pick_best_match(title, year, results);
    };
    if results.is_empty() {
        return None;
    }
    let candidates: Vec<Candidate> = results
        .iter()
        .map(|r| {
            let label = match r.year {
                Some(y) => format!("{} ({y})", r.title),
                None => r.title.clone(),
            };
            Candidate::new(label)
                .with_label2(r.overview.clone())
                .with_thumb(r.poster_url.clone())
        })
        .collect();
    selector
        .select(title, &candidates)
        .and_then(|i| results.get(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use artutils_core::MediaType;

    fn hit(id: &str, title: &str, year: Option<i32>) -> SearchResult {
        SearchResult {
            provider_id: id.to_string(),
            title: title.to_string(),
            year,
            media_type: MediaType::Movie,
            overview: None,
            poster_url: None,
        }
    }

    #[test]
    fn prefers_title_and_year_then_title_then_year() {
        let results = vec![
            hit("1", "The Thing", Some(2011)),
            hit("2", "Thing", Some(1982)),
            hit("3", "The Thing", Some(1982)),
        ];
        assert_eq!(pick_best_match("The Thing", Some(1982), &results).unwrap().provider_id, "3");
        assert_eq!(pick_best_match("the thing!", None, &results).unwrap().provider_id, "1");
        assert_eq!(pick_best_match("Other", Some(1982), &results).unwrap().provider_id, "2");
        assert_eq!(pick_best_match("Other", None, &results).unwrap().provider_id, "1");
        assert!(pick_best_match("x", None, &[]).is_none());
    }

    struct PickLast;
    impl Selector for PickLast {
        fn select(&self, _heading: &str, candidates: &[Candidate]) -> Option<usize> {
            candidates.len().checked_sub(1)
        }
    }

    struct Cancel;
    impl Selector for Cancel {
        fn select(&self, _heading: &str, _candidates: &[Candidate]) -> Option<usize> {
            None
        }
    }

    #[test]
    fn selector_overrides_automatic_match() {
        let results = vec![hit("1", "Alien", Some(1979)), hit("2", "Aliens", Some(1986))];
        assert_eq!(choose("Alien", None, &results, Some(&PickLast)).unwrap().provider_id, "2");
        assert!(choose("Alien", None, &results, Some(&Cancel)).is_none());
        assert_eq!(choose("Alien", None, &results, None).unwrap().provider_id, "1");
    }
}
