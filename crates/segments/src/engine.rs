//! The SegmentEngine evaluates rule-sets against contact pools.
//!
//! Dispatch goes through a field → matcher table. Fields missing from the
//! table (including `Field::Unknown`) are handled by `RejectAll`, so a rule
//! the engine does not understand always excludes the contact.

use crate::clock::{Clock, SystemClock};
use crate::matchers::{RejectAll, default_matchers};
use crate::phone::{CallingCodeNormalizer, PhoneNormalizer};
use crate::traits::{FieldMatcher, MatchContext};
use contacts::{Contact, ContactId, Field, FilterRule, MaterializedSegment, SegmentDefinition};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Contact pools at least this large are evaluated on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

/// Evaluates filter rules against contacts.
///
/// ## Usage
/// ```ignore
/// let engine = SegmentEngine::builder()
///     .clock(FixedClock::new(now))
///     .phone_normalizer(CallingCodeNormalizer::with_default_region("SA"))
///     .build();
///
/// let ids = engine.matching_ids(book.contacts(), &rules);
/// ```
pub struct SegmentEngine {
    matchers: HashMap<Field, Box<dyn FieldMatcher>>,
    fallback: RejectAll,
    clock: Box<dyn Clock>,
    phone: Box<dyn PhoneNormalizer>,
    parallel_threshold: usize,
}

impl SegmentEngine {
    /// Engine with the default field table, the system clock and a phone
    /// normalizer without a default region.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SegmentEngineBuilder {
        SegmentEngineBuilder::new()
    }

    /// Matcher responsible for `field`, or the `RejectAll` fallback.
    pub fn matcher_for(&self, field: Field) -> &dyn FieldMatcher {
        match self.matchers.get(&field) {
            Some(matcher) => matcher.as_ref(),
            None => {
                tracing::trace!("No matcher for field {}, rejecting", field);
                &self.fallback
            }
        }
    }

    fn context(&self) -> MatchContext<'_> {
        MatchContext {
            now: self.clock.now(),
            phone: self.phone.as_ref(),
        }
    }

    fn evaluate(&self, contact: &Contact, rule: &FilterRule, context: &MatchContext<'_>) -> bool {
        self.matcher_for(rule.field)
            .matches(contact, rule.operator, &rule.value, context)
    }

    /// Evaluate one rule against one contact.
    pub fn matches(&self, contact: &Contact, rule: &FilterRule) -> bool {
        self.evaluate(contact, rule, &self.context())
    }

    /// Identifiers of the contacts that satisfy every rule.
    ///
    /// An empty rule-set matches no contacts. The clock is read once, so all
    /// contacts are judged against the same "now".
    pub fn matching_ids(&self, contacts: &[Contact], rules: &[FilterRule]) -> HashSet<ContactId> {
        if rules.is_empty() {
            tracing::debug!(
                "Empty rule-set, no contacts match (input count: {})",
                contacts.len()
            );
            return HashSet::new();
        }

        let context = self.context();
        let keep = |contact: &&Contact| rules.iter().all(|rule| self.evaluate(contact, rule, &context));

        tracing::debug!(
            "Evaluating {} rules (input count: {})",
            rules.len(),
            contacts.len()
        );
        let ids: HashSet<ContactId> = if contacts.len() >= self.parallel_threshold {
            contacts
                .par_iter()
                .filter(keep)
                .map(|contact| contact.id.clone())
                .collect()
        } else {
            contacts
                .iter()
                .filter(keep)
                .map(|contact| contact.id.clone())
                .collect()
        };
        tracing::debug!("Rules evaluated (output count: {})", ids.len());

        ids
    }

    /// Per-rule outcomes for one contact.
    pub fn explain(&self, contact: &Contact, rules: &[FilterRule]) -> Explanation {
        let context = self.context();
        let outcomes: Vec<RuleOutcome> = rules
            .iter()
            .map(|rule| RuleOutcome {
                rule: rule.clone(),
                matcher: self.matcher_for(rule.field).name().to_string(),
                matched: self.evaluate(contact, rule, &context),
            })
            .collect();

        Explanation {
            contact_id: contact.id.clone(),
            matched: !outcomes.is_empty() && outcomes.iter().all(|o| o.matched),
            outcomes,
        }
    }

    /// Compute a segment's membership, sorted by contact id.
    pub fn materialize(
        &self,
        contacts: &[Contact],
        segment: &SegmentDefinition,
    ) -> MaterializedSegment {
        let mut contact_ids: Vec<ContactId> =
            self.matching_ids(contacts, &segment.rules).into_iter().collect();
        contact_ids.sort();

        tracing::info!(
            "Segment {} matched {} of {} contacts",
            segment.name,
            contact_ids.len(),
            contacts.len()
        );
        MaterializedSegment {
            name: segment.name.clone(),
            contact_ids,
        }
    }
}

impl Default for SegmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SegmentEngine`.
pub struct SegmentEngineBuilder {
    matchers: HashMap<Field, Box<dyn FieldMatcher>>,
    clock: Box<dyn Clock>,
    phone: Box<dyn PhoneNormalizer>,
    parallel_threshold: usize,
}

impl SegmentEngineBuilder {
    fn new() -> Self {
        Self {
            matchers: default_matchers().into_iter().collect(),
            clock: Box::new(SystemClock),
            phone: Box::new(CallingCodeNormalizer::new()),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn phone_normalizer(mut self, phone: impl PhoneNormalizer + 'static) -> Self {
        self.phone = Box::new(phone);
        self
    }

    /// Minimum pool size for parallel evaluation. `usize::MAX` disables it.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Register (or replace) the matcher for `field`.
    pub fn matcher(mut self, field: Field, matcher: impl FieldMatcher + 'static) -> Self {
        self.matchers.insert(field, Box::new(matcher));
        self
    }

    /// Remove the matcher for `field`; its rules then match nothing.
    pub fn without(mut self, field: Field) -> Self {
        self.matchers.remove(&field);
        self
    }

    pub fn build(self) -> SegmentEngine {
        SegmentEngine {
            matchers: self.matchers,
            fallback: RejectAll,
            clock: self.clock,
            phone: self.phone,
            parallel_threshold: self.parallel_threshold.max(1),
        }
    }
}

/// Result of one rule in an explanation.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub rule: FilterRule,
    /// Name of the matcher that decided the rule
    pub matcher: String,
    pub matched: bool,
}

/// Why a contact is (or is not) in a rule-set's result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub contact_id: ContactId,
    pub matched: bool,
    pub outcomes: Vec<RuleOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use contacts::{Operator, RuleValue};

    fn vip(id: &str) -> Contact {
        Contact {
            tags: vec!["VIP".to_string()],
            ..Contact::new(id)
        }
    }

    fn vip_rule() -> FilterRule {
        FilterRule::new(Field::Tags, Operator::HasAnyOf, RuleValue::list(["VIP"]))
    }

    #[test]
    fn test_empty_rule_set_matches_nothing() {
        let engine = SegmentEngine::new();
        let contacts = vec![vip("a"), vip("b")];
        assert!(engine.matching_ids(&contacts, &[]).is_empty());
    }

    #[test]
    fn test_single_rule() {
        let engine = SegmentEngine::new();
        let contacts = vec![vip("a"), Contact::new("b")];

        let ids = engine.matching_ids(&contacts, &[vip_rule()]);
        assert_eq!(ids, HashSet::from(["a".to_string()]));
    }

    #[test]
    fn test_unknown_field_uses_fallback() {
        let engine = SegmentEngine::new();
        assert_eq!(engine.matcher_for(Field::Unknown).name(), "rejectAll");

        let rule = FilterRule::new(Field::Unknown, Operator::Equals, RuleValue::text("x"));
        assert!(!engine.matches(&vip("a"), &rule));
    }

    #[test]
    fn test_without_removes_field() {
        let engine = SegmentEngine::builder().without(Field::Tags).build();
        assert!(!engine.matches(&vip("a"), &vip_rule()));
        assert_eq!(engine.matcher_for(Field::Tags).name(), "rejectAll");
    }

    struct AlwaysTrue;

    impl FieldMatcher for AlwaysTrue {
        fn name(&self) -> &str {
            "alwaysTrue"
        }

        fn matches(
            &self,
            _contact: &Contact,
            _operator: Operator,
            _value: &RuleValue,
            _context: &MatchContext<'_>,
        ) -> bool {
            true
        }
    }

    #[test]
    fn test_custom_matcher_replaces_default() {
        let engine = SegmentEngine::builder().matcher(Field::Tags, AlwaysTrue).build();
        let rule = FilterRule::unary(Field::Tags, Operator::Unknown);
        assert!(engine.matches(&Contact::new("a"), &rule));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let contacts: Vec<Contact> = (0..500)
            .map(|i| if i % 3 == 0 { vip(&i.to_string()) } else { Contact::new(i.to_string()) })
            .collect();
        let rules = [vip_rule()];

        let sequential = SegmentEngine::builder().parallel_threshold(usize::MAX).build();
        let parallel = SegmentEngine::builder().parallel_threshold(1).build();

        let expected = sequential.matching_ids(&contacts, &rules);
        assert_eq!(expected.len(), 167);
        assert_eq!(parallel.matching_ids(&contacts, &rules), expected);
    }

    #[test]
    fn test_explain() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let engine = SegmentEngine::builder().clock(FixedClock::new(now)).build();
        let contact = vip("a");
        let rules = vec![
            vip_rule(),
            FilterRule::unary(Field::CreatedAt, Operator::Exists),
        ];

        let explanation = engine.explain(&contact, &rules);
        assert_eq!(explanation.contact_id, "a");
        assert!(!explanation.matched);
        assert!(explanation.outcomes[0].matched);
        assert_eq!(explanation.outcomes[1].matcher, "createdAt");
        assert!(!explanation.outcomes[1].matched);

        let empty = engine.explain(&contact, &[]);
        assert!(!empty.matched);
        assert!(empty.outcomes.is_empty());
    }

    #[test]
    fn test_materialize_sorts_ids() {
        let engine = SegmentEngine::new();
        let contacts = vec![vip("c"), vip("a"), Contact::new("b"), vip("b2")];
        let segment = SegmentDefinition {
            name: "vip".to_string(),
            rules: vec![vip_rule()],
        };

        let materialized = engine.materialize(&contacts, &segment);
        assert_eq!(materialized.name, "vip");
        assert_eq!(materialized.contact_ids, vec!["a", "b2", "c"]);
    }
}
