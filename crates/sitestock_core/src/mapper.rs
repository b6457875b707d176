//! Conversion between storage rows and domain objects.
//!
//! # Responsibility
//! - Translate `ProjectRow`/`MaterialRow` to `Project`/`Material` and back.
//! - Default a missing material id while converting to storage form.
//!
//! # Invariants
//! - Conversions never mutate their input and perform no I/O.
//! - Output is fully determined by input, except for the generated id.
//! - Generated material ids are epoch milliseconds, strictly increasing
//!   within the process.

use crate::model::material::Material;
use crate::model::project::Project;
use crate::store::rows::{MaterialRow, ProjectRow};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_MATERIAL_ID: AtomicI64 = AtomicI64::new(0);

pub fn project_to_domain(row: ProjectRow) -> Project {
    Project {
        id: row.id,
        name: row.name,
        description: row.description,
        image_uri: row.image_uri,
        created_at: row.created_at,
    }
}

pub fn project_to_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id.clone(),
        name: project.name.clone(),
        description: project.description.clone(),
        image_uri: project.image_uri.clone(),
        created_at: project.created_at,
    }
}

/// Drops the owning project id; domain materials do not carry it.
pub fn material_to_domain(row: MaterialRow) -> Material {
    Material {
        id: row.id,
        name: row.name,
        quantity: row.quantity,
        unit: row.unit,
        price: row.price,
        description: row.description,
        is_purchased: row.is_purchased,
        created_at: row.created_at,
    }
}

/// Builds the storage row for `material` owned by `project_id`.
///
/// An empty `material.id` is replaced by a timestamp-derived id.
pub fn material_to_row(material: &Material, project_id: &str) -> MaterialRow {
    let id = if material.id.is_empty() {
        generate_material_id()
    } else {
        material.id.clone()
    };

    MaterialRow {
        id,
        project_id: project_id.to_string(),
        name: material.name.clone(),
        quantity: material.quantity.clone(),
        price: material.price.clone(),
        description: material.description.clone(),
        is_purchased: material.is_purchased,
        created_at: material.created_at,
        unit: material.unit.clone(),
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

fn generate_material_id() -> String {
    let now = epoch_millis();
    let mut last = LAST_MATERIAL_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_MATERIAL_ID.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{material_to_domain, material_to_row, project_to_domain, project_to_row};
    use crate::model::material::Material;
    use crate::model::project::Project;
    use std::collections::HashSet;

    fn cement() -> Material {
        Material {
            id: "m-1".to_string(),
            name: "Cement".to_string(),
            quantity: "10".to_string(),
            unit: "bags".to_string(),
            price: "50".to_string(),
            description: "grey".to_string(),
            is_purchased: true,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn material_round_trip_preserves_fields() {
        let material = cement();
        let row = material_to_row(&material, "p1");
        assert_eq!(row.project_id, "p1");
        assert_eq!(material_to_domain(row), material);
    }

    #[test]
    fn material_without_id_gets_numeric_timestamp_id() {
        let material = Material {
            id: String::new(),
            ..cement()
        };
        let row = material_to_row(&material, "p1");
        assert!(!row.id.is_empty());
        assert!(row.id.parse::<i64>().is_ok());

        let back = material_to_domain(row);
        assert_eq!(back.name, material.name);
        assert_eq!(back.unit, "bags");
    }

    #[test]
    fn generated_ids_do_not_collide_within_a_burst() {
        let material = Material::new("Sand", "2", "t", "80");
        let ids: HashSet<String> = (0..200)
            .map(|_| material_to_row(&material, "p1").id)
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn project_round_trip_preserves_optional_image() {
        let project = Project::new("Garage", "two cars")
            .with_id("p1")
            .with_image_uri("content://images/7");
        assert_eq!(project_to_domain(project_to_row(&project)), project);

        let bare = Project::new("Shed", "").with_id("p2");
        assert_eq!(project_to_domain(project_to_row(&bare)).image_uri, None);
    }
}
