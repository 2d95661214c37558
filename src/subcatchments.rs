//! Splitting a catchment into subcatchments at a set of cut elements.
//!
//! The graph work (execution ordering and subsetting) is done by the
//! engine; this module only sequences the calls and assembles the ordered
//! result. [`CatchmentSubsetting`] is the seam between the two.
use crate::error::{Result, SwiftError};
use crate::marshal::{cstring, CStringArray};
use crate::native;
use crate::simulation::Simulation;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
/// Key of the downstream part left over after all cuts.
pub const REMAINDER_KEY: &str = "remainder";
/// Which side of an element a subset keeps, and whether the element itself is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubsetAction {
    pub keep_above: bool,
    pub inclusive: bool,
}
impl SubsetAction {
    pub const KEEP_ABOVE: SubsetAction = SubsetAction { keep_above: true, inclusive: true };
    pub const KEEP_ABOVE_EXCLUSIVE: SubsetAction = SubsetAction { keep_above: true, inclusive: false };
    pub const KEEP_BELOW: SubsetAction = SubsetAction { keep_above: false, inclusive: true };
    pub const KEEP_BELOW_EXCLUSIVE: SubsetAction = SubsetAction { keep_above: false, inclusive: false };
}
impl Default for SubsetAction {
    fn default() -> Self {
        SubsetAction::KEEP_ABOVE
    }
}
/// Accepts `keep_above`, `keep above exclusive`, `keep_below_inclusive`...
impl FromStr for SubsetAction {
    type Err = SwiftError;
    fn from_str(s: &str) -> Result<Self> {
        let action = s.to_lowercase().replace('_', " ");
        let above = action.contains("above");
        if !above && !action.contains("below") {
            return Err(SwiftError::unknown("subset action", s));
        }
        Ok(SubsetAction {
            keep_above: above,
            inclusive: !action.contains("exclusive"),
        })
    }
}
impl fmt::Display for SubsetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.keep_above { "above" } else { "below" };
        let incl = if self.inclusive { "inclusive" } else { "exclusive" };
        write!(f, "keep_{side}_{incl}")
    }
}
/// A cut point and whether the element goes with its upstream part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SplitElement {
    pub element_id: String,
    pub include_upstream: bool,
}
impl SplitElement {
    pub fn new(element_id: impl Into<String>, include_upstream: bool) -> Self {
        Self {
            element_id: element_id.into(),
            include_upstream,
        }
    }
    /// Cut with the element kept in its upstream part.
    pub fn upstream(element_id: impl Into<String>) -> Self {
        Self::new(element_id, true)
    }
    fn actions(&self) -> (SubsetAction, SubsetAction) {
        if self.include_upstream {
            (SubsetAction::KEEP_ABOVE, SubsetAction::KEEP_BELOW_EXCLUSIVE)
        } else {
            (SubsetAction::KEEP_ABOVE_EXCLUSIVE, SubsetAction::KEEP_BELOW)
        }
    }
}
/// Catchment operations the split needs.
pub trait CatchmentSubsetting: Sized {
    fn sort_elements(&self, element_ids: &[String]) -> Result<Vec<String>>;
    fn subset(&self, element_id: &str, action: SubsetAction) -> Result<Self>;
    /// Number of nodes plus links.
    fn element_count(&self) -> Result<usize>;
    fn duplicate(&self) -> Result<Self>;
}
/// Subcatchments in execution order, keyed by cut element, plus an optional remainder.
#[derive(Debug)]
pub struct Subcatchments<C> {
    entries: Vec<(String, C)>,
}
impl<C> Subcatchments<C> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
    pub fn get(&self, key: &str) -> Option<&C> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }
    pub fn remainder(&self) -> Option<&C> {
        self.get(REMAINDER_KEY)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &C)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }
}
impl<C> IntoIterator for Subcatchments<C> {
    type Item = (String, C);
    type IntoIter = std::vec::IntoIter<(String, C)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
/// Carves the upstream part at each cut, most upstream first, off what is
/// left of the catchment. Whatever nodes or links remain downstream of the
/// last cut are returned under [`REMAINDER_KEY`].
pub fn split_to_subcatchments<C: CatchmentSubsetting>(
    catchment: &C,
    cuts: &[SplitElement],
) -> Result<Subcatchments<C>> {
    let mut seen = HashSet::new();
    for cut in cuts {
        if !seen.insert(cut.element_id.as_str()) {
            return Err(SwiftError::DuplicateElement(cut.element_id.clone()));
        }
    }
    let by_id: HashMap<&str, &SplitElement> =
        cuts.iter().map(|c| (c.element_id.as_str(), c)).collect();
    let ids: Vec<String> = cuts.iter().map(|c| c.element_id.clone()).collect();
    let sorted = catchment.sort_elements(&ids)?;
    SwiftError::check_len("sorted split elements", ids.len(), sorted.len())?;
    let mut entries = Vec::with_capacity(sorted.len() + 1);
    let mut remaining: Option<C> = None;
    for id in &sorted {
        let cut = by_id
            .get(id.as_str())
            .ok_or_else(|| SwiftError::unknown("split element", id.clone()))?;
        let (up_action, down_action) = cut.actions();
        let current = remaining.as_ref().unwrap_or(catchment);
        log::debug!("splitting at {id}: {up_action} then {down_action}");
        let upstream = current.subset(id, up_action)?;
        let downstream = current.subset(id, down_action)?;
        entries.push((id.clone(), upstream));
        remaining = Some(downstream);
    }
    let remaining = match remaining {
        Some(r) => r,
        None => catchment.duplicate()?,
    };
    if remaining.element_count()? > 0 {
        if by_id.contains_key(REMAINDER_KEY) {
            return Err(SwiftError::ReservedKeyCollision(REMAINDER_KEY.to_string()));
        }
        entries.push((REMAINDER_KEY.to_string(), remaining));
    }
    Ok(Subcatchments { entries })
}
impl Simulation {
    /// Keeps the part of the catchment above or below `element_id`.
    pub fn subset_catchment(&self, element_id: &str, action: SubsetAction) -> Result<Simulation> {
        self.subset_with_terminations(element_id, action, &[] as &[&str])
    }
    /// Network between `bottom_element_id` and the `top_element_ids`, both ends kept.
    /// Only meaningful for dendritic catchments without confluences in between.
    pub fn cookie_cut_dendritic_catchment<S: AsRef<str>>(
        &self,
        bottom_element_id: &str,
        top_element_ids: &[S],
    ) -> Result<Simulation> {
        self.subset_with_terminations(bottom_element_id, SubsetAction::KEEP_ABOVE, top_element_ids)
    }
    fn subset_with_terminations<S: AsRef<str>>(
        &self,
        element_id: &str,
        action: SubsetAction,
        terminations: &[S],
    ) -> Result<Simulation> {
        let element = cstring(element_id)?;
        let mut stops = CStringArray::new(terminations)?;
        let ptr = native::call(|api| unsafe {
            (api.subset_model)(
                self.ptr(),
                element.as_ptr(),
                action.keep_above,
                action.inclusive,
                false,
                stops.as_mut_ptr(),
                stops.len(),
            )
        })?;
        Simulation::from_native(ptr, "SubsetModel")
    }
    pub fn split_to_subcatchments(&self, cuts: &[SplitElement]) -> Result<Subcatchments<Simulation>> {
        split_to_subcatchments(self, cuts)
    }
}
impl CatchmentSubsetting for Simulation {
    fn sort_elements(&self, element_ids: &[String]) -> Result<Vec<String>> {
        self.sort_by_execution_order(element_ids, "")
    }
    fn subset(&self, element_id: &str, action: SubsetAction) -> Result<Self> {
        self.subset_catchment(element_id, action)
    }
    fn element_count(&self) -> Result<usize> {
        Ok(self.num_nodes()? + self.num_links()?)
    }
    fn duplicate(&self) -> Result<Self> {
        self.try_clone()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::BTreeSet;
    /// Node-link network where element ids are `node.<id>` or the bare node id.
    #[derive(Clone, Debug)]
    struct MemCatchment {
        nodes: BTreeSet<String>,
        links: Vec<(String, String, String)>,
    }
    impl MemCatchment {
        fn new(links: &[(&str, &str, &str)]) -> Self {
            let links: Vec<_> = links
                .iter()
                .map(|(l, f, t)| (l.to_string(), f.to_string(), t.to_string()))
                .collect();
            let nodes = links
                .iter()
                .flat_map(|(_, f, t)| [f.clone(), t.clone()])
                .collect();
            Self { nodes, links }
        }
        fn fixture() -> Self {
            Self::new(&[
                ("lnk1", "n2", "n6"),
                ("lnk2", "n5", "n2"),
                ("lnk3", "n4", "n2"),
                ("lnk4", "n3", "n4"),
                ("lnk5", "n1", "n4"),
            ])
        }
        fn node_of(&self, element_id: &str) -> Result<String> {
            let node = element_id.strip_prefix("node.").unwrap_or(element_id);
            if self.nodes.contains(node) {
                Ok(node.to_string())
            } else {
                Err(SwiftError::unknown("element", element_id))
            }
        }
        fn upstream_of(&self, node: &str) -> BTreeSet<String> {
            let mut found = BTreeSet::from([node.to_string()]);
            let mut frontier = vec![node.to_string()];
            while let Some(n) = frontier.pop() {
                for (_, from, to) in &self.links {
                    if *to == n && found.insert(from.clone()) {
                        frontier.push(from.clone());
                    }
                }
            }
            found
        }
        fn depth(&self, node: &str) -> usize {
            self.links
                .iter()
                .find(|(_, from, _)| from == node)
                .map_or(0, |(_, _, to)| 1 + self.depth(to))
        }
        fn keep(&self, nodes: BTreeSet<String>) -> Self {
            let links = self
                .links
                .iter()
                .filter(|(_, f, t)| nodes.contains(f) && nodes.contains(t))
                .cloned()
                .collect();
            Self { nodes, links }
        }
        fn node_ids(&self) -> Vec<&str> {
            self.nodes.iter().map(String::as_str).collect()
        }
    }
    impl CatchmentSubsetting for MemCatchment {
        fn sort_elements(&self, element_ids: &[String]) -> Result<Vec<String>> {
            let mut keyed = element_ids
                .iter()
                .map(|id| Ok((self.depth(&self.node_of(id)?), id.clone())))
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            Ok(keyed.into_iter().map(|(_, id)| id).collect())
        }
        fn subset(&self, element_id: &str, action: SubsetAction) -> Result<Self> {
            let node = self.node_of(element_id)?;
            let mut above = self.upstream_of(&node);
            if !action.inclusive && action.keep_above {
                above.remove(&node);
            }
            if action.inclusive && !action.keep_above {
                above.remove(&node);
            }
            let kept = if action.keep_above {
                above
            } else {
                self.nodes.difference(&above).cloned().collect()
            };
            Ok(self.keep(kept))
        }
        fn element_count(&self) -> Result<usize> {
            Ok(self.nodes.len() + self.links.len())
        }
        fn duplicate(&self) -> Result<Self> {
            Ok(self.clone())
        }
    }
    fn cuts(ids: &[&str]) -> Vec<SplitElement> {
        ids.iter().map(|id| SplitElement::upstream(*id)).collect()
    }
    #[test]
    fn fixture_split_orders_upstream_first_with_remainder() {
        let cat = MemCatchment::fixture();
        let split = split_to_subcatchments(&cat, &cuts(&["node.n2", "node.n4"])).unwrap();
        assert_eq!(split.keys().collect::<Vec<_>>(), vec!["node.n4", "node.n2", "remainder"]);
        assert_eq!(split.get("node.n4").unwrap().node_ids(), vec!["n1", "n3", "n4"]);
        assert_eq!(split.get("node.n2").unwrap().node_ids(), vec!["n2", "n5"]);
        assert_eq!(split.remainder().unwrap().node_ids(), vec!["n6"]);
    }
    #[test]
    fn input_order_does_not_change_the_result() {
        let cat = MemCatchment::fixture();
        let mut rng = StdRng::seed_from_u64(42);
        let mut ids = vec!["node.n2", "node.n4", "node.n5"];
        for _ in 0..6 {
            ids.shuffle(&mut rng);
            let split = split_to_subcatchments(&cat, &cuts(&ids)).unwrap();
            assert_eq!(
                split.keys().collect::<Vec<_>>(),
                vec!["node.n4", "node.n5", "node.n2", "remainder"]
            );
        }
    }
    #[test]
    fn include_upstream_flags_follow_their_elements_through_sorting() {
        let cat = MemCatchment::fixture();
        let cuts = vec![
            SplitElement::new("node.n2", true),
            SplitElement::new("node.n4", false),
        ];
        let split = split_to_subcatchments(&cat, &cuts).unwrap();
        assert_eq!(split.get("node.n4").unwrap().node_ids(), vec!["n1", "n3"]);
        assert_eq!(split.get("node.n2").unwrap().node_ids(), vec!["n2", "n4", "n5"]);
        assert_eq!(split.remainder().unwrap().node_ids(), vec!["n6"]);
    }
    #[test]
    fn duplicates_are_rejected() {
        let cat = MemCatchment::fixture();
        let err = split_to_subcatchments(&cat, &cuts(&["node.n2", "node.n2"])).unwrap_err();
        assert!(matches!(err, SwiftError::DuplicateElement(id) if id == "node.n2"));
    }
    #[test]
    fn no_remainder_when_cutting_at_the_outlet() {
        let cat = MemCatchment::fixture();
        let split = split_to_subcatchments(&cat, &cuts(&["node.n4", "node.n6"])).unwrap();
        assert_eq!(split.keys().collect::<Vec<_>>(), vec!["node.n4", "node.n6"]);
        assert!(split.remainder().is_none());
    }
    #[test]
    fn remainder_key_collision() {
        let cat = MemCatchment::new(&[("l1", "remainder", "outlet")]);
        let err = split_to_subcatchments(&cat, &cuts(&["remainder"])).unwrap_err();
        assert!(matches!(err, SwiftError::ReservedKeyCollision(_)));
        // Fine when nothing is left downstream.
        let split = split_to_subcatchments(&cat, &cuts(&["outlet", "remainder"])).unwrap();
        assert_eq!(split.keys().collect::<Vec<_>>(), vec!["remainder", "outlet"]);
    }
    #[test]
    fn no_cuts_returns_the_whole_catchment_as_remainder() {
        let cat = MemCatchment::fixture();
        let split = split_to_subcatchments(&cat, &[]).unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(split.remainder().unwrap().node_ids().len(), 6);
    }
    #[test]
    fn subset_action_parsing() {
        assert_eq!("keep_above".parse::<SubsetAction>().unwrap(), SubsetAction::KEEP_ABOVE);
        assert_eq!(
            "Keep Above Exclusive".parse::<SubsetAction>().unwrap(),
            SubsetAction::KEEP_ABOVE_EXCLUSIVE
        );
        assert_eq!(
            "keep_below_inclusive".parse::<SubsetAction>().unwrap(),
            SubsetAction::KEEP_BELOW
        );
        assert_eq!(
            SubsetAction::KEEP_BELOW_EXCLUSIVE.to_string().parse::<SubsetAction>().unwrap(),
            SubsetAction::KEEP_BELOW_EXCLUSIVE
        );
        assert!("keep_sideways".parse::<SubsetAction>().is_err());
    }
    #[test]
    fn split_actions_pair_up_and_down() {
        assert_eq!(
            SplitElement::new("x", true).actions(),
            (SubsetAction::KEEP_ABOVE, SubsetAction::KEEP_BELOW_EXCLUSIVE)
        );
        assert_eq!(
            SplitElement::new("x", false).actions(),
            (SubsetAction::KEEP_ABOVE_EXCLUSIVE, SubsetAction::KEEP_BELOW)
        );
    }
}
