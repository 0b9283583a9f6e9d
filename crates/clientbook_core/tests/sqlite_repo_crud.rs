use clientbook_core::db::DbError;
use clientbook_core::{
    Client, ClientRepository, RepoError, SortField, SqliteClientRepository, StorageError,
};
use rusqlite::Connection;

fn sample(surname: &str, name: &str) -> Client {
    Client::new(surname, name, "", "Main St 1", "+1-555-123-4567").unwrap()
}

#[test]
fn add_then_get_returns_exact_fields() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();

    let id = repo
        .add_client(
            Client::new(
                "Ivanov",
                "Ivan",
                "Ivanovich",
                "Main St 1",
                "+1-555-123-4567",
            )
            .unwrap(),
        )
        .unwrap();

    let loaded = repo.get_by_id(id).unwrap();
    assert_eq!(loaded.surname, "Ivanov");
    assert_eq!(loaded.name, "Ivan");
    assert_eq!(loaded.patronymic, "Ivanovich");
    assert_eq!(loaded.address, "Main St 1");
    assert_eq!(loaded.phone, "+1-555-123-4567");
    assert_eq!(loaded.id(), Some(id));
}

#[test]
fn engine_assigns_distinct_sequential_identifiers() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();

    let mut ids = Vec::new();
    for surname in ["Ivanov", "Petrov", "Sidorov"] {
        ids.push(repo.add_client(sample(surname, "Ivan")).unwrap());
    }

    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(repo.count().unwrap(), 3);
}

#[test]
fn empty_patronymic_round_trips_through_null_column() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    let id = repo.add_client(sample("Ivanov", "Ivan")).unwrap();

    let loaded = repo.get_by_id(id).unwrap();
    assert_eq!(loaded.patronymic, "");
}

#[test]
fn replace_updates_row_in_place() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    repo.add_client(sample("Ivanov", "Ivan")).unwrap();
    let id = repo.add_client(sample("Petrov", "Petr")).unwrap();

    repo.replace_by_id(id, sample("Orlov", "Oleg")).unwrap();

    let loaded = repo.get_by_id(id).unwrap();
    assert_eq!(loaded.surname, "Orlov");
    assert_eq!(loaded.id(), Some(id));
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn missing_id_operations_report_not_found() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    repo.add_client(sample("Ivanov", "Ivan")).unwrap();

    assert!(matches!(
        repo.get_by_id(9999).unwrap_err(),
        RepoError::NotFound(9999)
    ));
    assert!(matches!(
        repo.replace_by_id(9999, sample("Orlov", "Oleg")).unwrap_err(),
        RepoError::NotFound(9999)
    ));
    assert!(matches!(
        repo.delete_by_id(9999).unwrap_err(),
        RepoError::NotFound(9999)
    ));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn delete_removes_row() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    let id = repo.add_client(sample("Ivanov", "Ivan")).unwrap();
    repo.add_client(sample("Petrov", "Petr")).unwrap();

    repo.delete_by_id(id).unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    assert!(matches!(
        repo.get_by_id(id).unwrap_err(),
        RepoError::NotFound(_)
    ));
}

#[test]
fn identifiers_are_never_reused_after_delete() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    let first = repo.add_client(sample("Ivanov", "Ivan")).unwrap();
    repo.delete_by_id(first).unwrap();

    let second = repo.add_client(sample("Petrov", "Petr")).unwrap();
    assert!(second > first);
}

#[test]
fn sort_orders_fresh_reads_without_mutating_rows() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    repo.add_client(sample("Zaytsev", "Boris")).unwrap();
    repo.add_client(sample("Antonov", "Anna")).unwrap();

    repo.sort_by(SortField::Name).unwrap();
    let names: Vec<_> = repo
        .read_all()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Anna", "Boris"]);

    // Stored order (insertion order by identifier) is untouched.
    repo.sort_by(SortField::ClientId).unwrap();
    let surnames: Vec<_> = repo
        .read_all()
        .unwrap()
        .into_iter()
        .map(|c| c.surname)
        .collect();
    assert_eq!(surnames, vec!["Zaytsev", "Antonov"]);
}

#[test]
fn pages_reconstruct_full_ordering() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    for surname in ["Antonov", "Borisov", "Volkov", "Gusev", "Dmitriev"] {
        repo.add_client(sample(surname, "Ivan")).unwrap();
    }
    repo.sort_by(SortField::Surname).unwrap();

    let mut gathered = Vec::new();
    let mut page_number = 1;
    loop {
        let page = repo.page(page_number, 2).unwrap();
        if page.is_empty() {
            break;
        }
        gathered.extend(page);
        page_number += 1;
    }

    assert_eq!(gathered, repo.read_all().unwrap());
    assert!(repo.page(9, 2).unwrap().is_empty());
    assert!(repo.page(0, 2).unwrap().is_empty());
}

#[test]
fn close_is_idempotent_and_blocks_further_operations() {
    let mut repo = SqliteClientRepository::open_in_memory().unwrap();
    repo.add_client(sample("Ivanov", "Ivan")).unwrap();

    repo.close().unwrap();
    repo.close().unwrap();

    let err = repo.count().unwrap_err();
    assert!(matches!(
        err,
        RepoError::Storage(StorageError::Db(DbError::Closed))
    ));
}

#[test]
fn from_connection_rejects_unmigrated_database() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteClientRepository::from_connection(conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Storage(StorageError::Db(DbError::MissingTable("clients")))
    ));
}

#[test]
fn persisted_database_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clients.db");

    let mut repo = SqliteClientRepository::open(&path).unwrap();
    let id = repo.add_client(sample("Ivanov", "Ivan")).unwrap();
    repo.close().unwrap();

    let reopened = SqliteClientRepository::open(&path).unwrap();
    assert_eq!(reopened.get_by_id(id).unwrap().surname, "Ivanov");
}
