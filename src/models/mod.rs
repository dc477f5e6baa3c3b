// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - users : Comptes du personnel (admin / doctor / assistant)
//   - patient : Dossiers patients (identité, contact, données cliniques)
//   - transfusion : Transfusions planifiées et leur statut
//   - daily_history : Journal dénormalisé par jour calendaire (reporting)
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les ensembles fermés (rôle, statut, priorité, catégorie) sont des
//     ActiveEnum stockés en chaîne
//   - Les patients ne sont jamais supprimés physiquement (status=deleted)
//
// ============================================================================

pub mod daily_history;
pub mod dto;
pub mod patient;
pub mod transfusion;
pub mod users;
