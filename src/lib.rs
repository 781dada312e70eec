/*

<?xml version="1.0" encoding="utf-8"?>
<pbcore:pbcoreDescriptionDocument xmlns:pbcore="http://www.pbcore.org/PBCore/PBCoreNamespace.html">
  <!--Automatically generated by bwf2pbcore. DO NOT EDIT BY HAND.-->
  <pbcore:pbcoreAssetType>oral history</pbcore:pbcoreAssetType>
  <pbcore:pbcoreTitle>Interview with Jane Smith</pbcore:pbcoreTitle>
  <pbcore:pbcoreSubject source="wikidata" ref="https://www.wikidata.org/wiki/Q49371" subjectType="topic">unions</pbcore:pbcoreSubject>
  ...
</pbcore:pbcoreDescriptionDocument>

*/

pub mod bwf;
pub mod metadata;
pub mod ohms;
pub mod pbcore;
pub mod values;
pub mod xmp;

pub use metadata::MetadataRecord;
pub use values::{AnnotatedValue, split_multivalue};
