//! Reference gene database.
//!
//! The database maps each reference id that can appear in the alignment output
//! to its gene length, antibiotic category and resistance mechanism. It is an
//! external artifact: this crate only loads it.
//!
//! ## Formats
//!
//! - **JSON**: `{"version": "1.0.0", "created_at": ..., "genes": [...]}`
//! - **TSV**: `id  length  [category]  [mechanism]  [gene_name]`
//!
//! Ids in the `accession|FEATURES|source|category|gene` layout carry their own
//! category and gene name, which fill whatever the metadata leaves out.
//!
//! ## Example
//!
//! ```rust,no_run
//! use arg_resolver::database::store::ReferenceDatabase;
//! use std::path::Path;
//!
//! let db = ReferenceDatabase::load_from_file(Path::new("features.json")).unwrap();
//! if let Some(gene) = db.get("AAB60941.1|FEATURES|CARD|beta-lactam|TEM-1") {
//!     println!("{} ({:?} aa)", gene.display_name(), gene.gene_length);
//! }
//! ```

pub mod store;
