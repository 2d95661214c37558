use crate::error::{Result, SwiftError};
use crate::marshal::{copy_string, cstring, CStringArray};
use crate::native::{self, structs::CatchmentStructureData};
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};
use std::os::raw::c_int;
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkRecord {
    pub id: String,
    pub name: String,
    pub length_metres: f64,
    pub f: f64,
    pub mannings_n: f64,
    pub slope: f64,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubareaRecord {
    pub id: String,
    pub name: String,
    pub area_km2: f64,
}
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeLinkRecord {
    pub downstream_id: String,
    pub upstream_id: String,
    pub link_id: String,
}
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubareaLinkRecord {
    pub link_id: String,
    pub subarea_id: String,
}
/// Connectivity of nodes, links and subareas as reported by the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatchmentStructure {
    pub node: Vec<NodeRecord>,
    pub link: Vec<LinkRecord>,
    pub subarea: Vec<SubareaRecord>,
    pub node_link: Vec<NodeLinkRecord>,
    pub subarea_link: Vec<SubareaLinkRecord>,
}
unsafe fn records<T, R>(ptr: *mut T, count: c_int, f: impl Fn(&T) -> Result<R>) -> Result<Vec<R>> {
    if ptr.is_null() || count <= 0 {
        return Ok(Vec::new());
    }
    std::slice::from_raw_parts(ptr, count as usize).iter().map(f).collect()
}
impl CatchmentStructure {
    /// Copies the structure; the caller still owns and disposes `data`.
    unsafe fn from_native(data: &CatchmentStructureData) -> Result<Self> {
        Ok(Self {
            node: records(data.nodes, data.num_nodes, |n| {
                Ok(NodeRecord {
                    id: copy_string(n.id)?,
                    name: copy_string(n.name)?,
                })
            })?,
            link: records(data.links, data.num_links, |l| {
                Ok(LinkRecord {
                    id: copy_string(l.id)?,
                    name: copy_string(l.name)?,
                    length_metres: l.length_metres,
                    f: l.f,
                    mannings_n: l.mannings_n,
                    slope: l.slope,
                })
            })?,
            subarea: records(data.subareas, data.num_subareas, |s| {
                Ok(SubareaRecord {
                    id: copy_string(s.id)?,
                    name: copy_string(s.name)?,
                    area_km2: s.subarea_surface_km2,
                })
            })?,
            node_link: records(data.node_link_connections, data.num_node_link_connections, |c| {
                Ok(NodeLinkRecord {
                    downstream_id: copy_string(c.downstream_node_id)?,
                    upstream_id: copy_string(c.upstream_node_id)?,
                    link_id: copy_string(c.link_id)?,
                })
            })?,
            subarea_link: records(
                data.subarea_link_connections,
                data.num_subarea_link_connections,
                |c| {
                    Ok(SubareaLinkRecord {
                        link_id: copy_string(c.link_id)?,
                        subarea_id: copy_string(c.subarea_id)?,
                    })
                },
            )?,
        })
    }
    /// Links draining directly into `node_id`.
    pub fn upstream_links(&self, node_id: &str) -> Vec<&str> {
        self.node_link
            .iter()
            .filter(|c| c.downstream_id == node_id)
            .map(|c| c.link_id.as_str())
            .collect()
    }
}
impl Simulation {
    pub fn catchment_structure(&self) -> Result<CatchmentStructure> {
        let ptr = native::call(|api| unsafe { (api.get_catchment_structure)(self.ptr()) })?;
        if ptr.is_null() {
            return Err(SwiftError::NullHandle("GetCatchmentStructure"));
        }
        let api = native::SwiftApi::instance()?;
        let copied = unsafe { CatchmentStructure::from_native(&*ptr) };
        unsafe { (api.dispose_catchment_structure)(ptr) };
        copied
    }
    /// Builds a simulation from a node-link description; see [`CatchmentDefinition`].
    pub fn from_definition(definition: &CatchmentDefinition) -> Result<Self> {
        definition.validate()?;
        let mut node_ids = CStringArray::new(&definition.node_ids)?;
        let mut node_names = CStringArray::new(&definition.node_names)?;
        let mut link_ids = CStringArray::new(&definition.link_ids)?;
        let mut link_names = CStringArray::new(&definition.link_names)?;
        let mut from_node = CStringArray::new(&definition.link_from_node)?;
        let mut to_node = CStringArray::new(&definition.link_to_node)?;
        let runoff = cstring(&definition.runoff_model)?;
        let mut areas = definition.areas();
        log::debug!(
            "creating catchment with {} nodes and {} links ({})",
            definition.node_ids.len(),
            definition.link_ids.len(),
            definition.runoff_model
        );
        let ptr = native::call(|api| unsafe {
            (api.create_catchment)(
                node_ids.len(),
                node_ids.as_mut_ptr(),
                node_names.as_mut_ptr(),
                link_ids.len(),
                link_ids.as_mut_ptr(),
                link_names.as_mut_ptr(),
                from_node.as_mut_ptr(),
                to_node.as_mut_ptr(),
                runoff.as_ptr(),
                areas.as_mut_ptr(),
            )
        })?;
        Self::from_native(ptr, "CreateCatchment")
    }
}
/// Node-link network description for [`Simulation::from_definition`].
///
/// Each link has one subarea of the same identifier; `areas_km2` defaults to
/// 1 km2 per link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatchmentDefinition {
    pub node_ids: Vec<String>,
    pub node_names: Vec<String>,
    pub link_ids: Vec<String>,
    pub link_names: Vec<String>,
    pub link_from_node: Vec<String>,
    pub link_to_node: Vec<String>,
    #[serde(default = "default_runoff_model")]
    pub runoff_model: String,
    #[serde(default)]
    pub areas_km2: Option<Vec<f64>>,
}
fn default_runoff_model() -> String {
    "GR4J".to_string()
}
impl CatchmentDefinition {
    pub fn validate(&self) -> Result<()> {
        let nodes = self.node_ids.len();
        let links = self.link_ids.len();
        SwiftError::check_len("node names", nodes, self.node_names.len())?;
        SwiftError::check_len("link names", links, self.link_names.len())?;
        SwiftError::check_len("link upstream nodes", links, self.link_from_node.len())?;
        SwiftError::check_len("link downstream nodes", links, self.link_to_node.len())?;
        if let Some(areas) = &self.areas_km2 {
            SwiftError::check_len("subarea areas", links, areas.len())?;
        }
        for node in self.link_from_node.iter().chain(&self.link_to_node) {
            if !self.node_ids.contains(node) {
                return Err(SwiftError::unknown("node", node.clone()));
            }
        }
        Ok(())
    }
    fn areas(&self) -> Vec<f64> {
        self.areas_km2
            .clone()
            .unwrap_or_else(|| vec![1.0; self.link_ids.len()])
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::structs::{LinkInfo, NodeInfo, NodeLinkConnection};
    use std::ffi::CString;
    fn definition() -> CatchmentDefinition {
        let ids = |prefix: &str, n: usize| (1..=n).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>();
        let nodes = ids("n", 3);
        let links = ids("lnk", 2);
        CatchmentDefinition {
            node_names: nodes.iter().map(|n| format!("{n}_name")).collect(),
            link_names: links.iter().map(|l| format!("{l}_name")).collect(),
            node_ids: nodes,
            link_ids: links,
            link_from_node: vec!["n1".into(), "n2".into()],
            link_to_node: vec!["n2".into(), "n3".into()],
            runoff_model: default_runoff_model(),
            areas_km2: None,
        }
    }
    #[test]
    fn areas_default_to_one_per_link() {
        let def = definition();
        def.validate().unwrap();
        assert_eq!(def.areas(), vec![1.0, 1.0]);
    }
    #[test]
    fn parallel_arrays_must_agree() {
        let mut def = definition();
        def.link_to_node.pop();
        let err = def.validate().unwrap_err();
        assert!(matches!(
            err,
            SwiftError::LengthMismatch { what: "link downstream nodes", expected: 2, actual: 1 }
        ));
        let mut def = definition();
        def.areas_km2 = Some(vec![2.5]);
        assert!(def.validate().is_err());
    }
    #[test]
    fn links_must_reference_known_nodes() {
        let mut def = definition();
        def.link_to_node[1] = "n9".into();
        let err = def.validate().unwrap_err();
        assert!(err.to_string().contains("n9"));
    }
    #[test]
    fn definition_reads_from_json_with_defaults() {
        let json = r#"{
            "node_ids": ["a", "b"], "node_names": ["A", "B"],
            "link_ids": ["l"], "link_names": ["L"],
            "link_from_node": ["a"], "link_to_node": ["b"]
        }"#;
        let def: CatchmentDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.runoff_model, "GR4J");
        assert_eq!(def.areas(), vec![1.0]);
    }
    #[test]
    fn structure_is_copied_from_native_arrays() {
        let s = |v: &str| CString::new(v).unwrap().into_raw();
        let mut nodes = [
            NodeInfo { id: s("n1"), name: s("n1_name") },
            NodeInfo { id: s("n2"), name: s("n2_name") },
        ];
        let mut links = [LinkInfo {
            id: s("lnk1"),
            name: s("lnk1_name"),
            length_metres: 1200.0,
            f: 1.0,
            mannings_n: 0.03,
            slope: 0.001,
        }];
        let mut conns = [NodeLinkConnection {
            link_id: s("lnk1"),
            upstream_node_id: s("n1"),
            downstream_node_id: s("n2"),
        }];
        let data = CatchmentStructureData {
            num_nodes: 2,
            num_links: 1,
            num_subareas: 0,
            num_node_link_connections: 1,
            num_subarea_link_connections: 0,
            nodes: nodes.as_mut_ptr(),
            links: links.as_mut_ptr(),
            subareas: std::ptr::null_mut(),
            node_link_connections: conns.as_mut_ptr(),
            subarea_link_connections: std::ptr::null_mut(),
        };
        let structure = unsafe { CatchmentStructure::from_native(&data) }.unwrap();
        assert_eq!(structure.node[1].name, "n2_name");
        assert_eq!(structure.link[0].length_metres, 1200.0);
        assert!(structure.subarea.is_empty());
        assert_eq!(structure.node_link[0].upstream_id, "n1");
        assert_eq!(structure.upstream_links("n2"), vec!["lnk1"]);
        let json = serde_json::to_value(&structure).unwrap();
        assert!(json.get("NodeLink").is_some());
        for p in [nodes[0].id, nodes[0].name, nodes[1].id, nodes[1].name, links[0].id, links[0].name] {
            drop(unsafe { CString::from_raw(p) });
        }
        for p in [conns[0].link_id, conns[0].upstream_node_id, conns[0].downstream_node_id] {
            drop(unsafe { CString::from_raw(p) });
        }
    }
}
