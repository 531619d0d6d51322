use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use census_core::fields::{join_ids, optional_id, split_ids};
use census_core::{
    Address, AddressId, Dataset, EntityKind, LoadedRecords, Person, PersonId, Workplace,
    WorkplaceId, redact_database_url,
};
use regex::Regex;
use sqlx::AnyPool;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{Executor, Row};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::rows::parse_age;

static TABLE_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// Database engines reachable through the `any` driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Pick the engine from the connection string scheme.
    pub fn detect(url: &str) -> StoreResult<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(StoreError::Config(format!(
                "unsupported database url '{}'",
                redact_database_url(url)
            )))
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table name per record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTables {
    pub people: String,
    pub workplaces: String,
    pub addresses: String,
}

impl Default for SqlTables {
    fn default() -> Self {
        Self {
            people: "person".to_string(),
            workplaces: "workplace".to_string(),
            addresses: "address".to_string(),
        }
    }
}

impl SqlTables {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Person => &self.people,
            EntityKind::Workplace => &self.workplaces,
            EntityKind::Address => &self.addresses,
        }
    }

    fn validate(&self) -> StoreResult<()> {
        for name in [&self.people, &self.workplaces, &self.addresses] {
            let valid = TABLE_NAME
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(name));
            if !valid {
                return Err(StoreError::Config(format!(
                    "table name '{name}' is not a plain identifier"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SqlOptions {
    pub url: Option<String>,
    /// Drop and recreate each table before writing it.
    pub recreate: bool,
    pub tables: SqlTables,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            url: None,
            recreate: true,
            tables: SqlTables::default(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Relational export/import over PostgreSQL or SQLite.
///
/// Each kind lives in its own table keyed by `ID`. People reference their
/// workplace and address through foreign keys; employee and resident lists
/// are kept as id text on the owning side.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: AnyPool,
    backend: Backend,
    tables: SqlTables,
    recreate: bool,
}

impl SqlStore {
    /// Connect using `options`. A missing url is a configuration error.
    pub async fn from_config(options: &SqlOptions) -> StoreResult<Self> {
        let url = options
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StoreError::Config("database url is not configured".to_string()))?;
        let backend = Backend::detect(url)?;
        options.tables.validate()?;

        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .acquire_timeout(options.acquire_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if backend == Backend::Sqlite {
                        conn.execute("PRAGMA foreign_keys = ON").await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await?;

        info!(
            event = "database_connected",
            engine = %backend,
            url = %redact_database_url(url),
        );

        Ok(Self {
            pool,
            backend,
            tables: options.tables.clone(),
            recreate: options.recreate,
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub async fn write_dataset(&self, dataset: &Dataset) -> StoreResult<()> {
        self.write_workplaces(dataset.workplaces()).await?;
        self.write_addresses(dataset.addresses()).await?;
        self.write_people(dataset.people()).await?;
        info!(event = "dataset_written", engine = %self.backend);
        Ok(())
    }

    pub async fn read_all(&self) -> StoreResult<LoadedRecords> {
        let records = LoadedRecords {
            workplaces: self.read_workplaces().await?,
            addresses: self.read_addresses().await?,
            people: self.read_people().await?,
        };
        info!(
            event = "records_loaded",
            engine = %self.backend,
            people = records.people.len(),
            workplaces = records.workplaces.len(),
            addresses = records.addresses.len(),
        );
        Ok(records)
    }

    pub async fn write_workplaces(&self, workplaces: &[Workplace]) -> StoreResult<()> {
        let table = self.tables.for_kind(EntityKind::Workplace);
        self.prepare_table(
            table,
            &format!(
                "{table} (\
                 ID VARCHAR(32) PRIMARY KEY, \
                 NAME VARCHAR(255) NOT NULL, \
                 LOCATION VARCHAR(255) NOT NULL, \
                 EMPLOYEES TEXT NOT NULL)"
            ),
        )
        .await?;

        let insert =
            format!("INSERT INTO {table} (ID, NAME, LOCATION, EMPLOYEES) VALUES ($1, $2, $3, $4)");
        let mut tx = self.pool.begin().await?;
        for workplace in workplaces {
            sqlx::query(&insert)
                .bind(workplace.id.to_string())
                .bind(workplace.name.clone())
                .bind(workplace.location.clone())
                .bind(join_ids(&workplace.employees))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!(event = "table_written", table, rows = workplaces.len());
        Ok(())
    }

    pub async fn write_addresses(&self, addresses: &[Address]) -> StoreResult<()> {
        let table = self.tables.for_kind(EntityKind::Address);
        self.prepare_table(
            table,
            &format!(
                "{table} (\
                 ID VARCHAR(32) PRIMARY KEY, \
                 STREET VARCHAR(255) NOT NULL, \
                 CITY VARCHAR(255) NOT NULL, \
                 COUNTRY VARCHAR(255) NOT NULL, \
                 RESIDENT_ID VARCHAR(32))"
            ),
        )
        .await?;

        let insert = format!(
            "INSERT INTO {table} (ID, STREET, CITY, COUNTRY, RESIDENT_ID) VALUES ($1, $2, $3, $4, $5)"
        );
        let mut tx = self.pool.begin().await?;
        for address in addresses {
            sqlx::query(&insert)
                .bind(address.id.to_string())
                .bind(address.street.clone())
                .bind(address.city.clone())
                .bind(address.country.clone())
                .bind(address.resident.as_ref().map(ToString::to_string))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!(event = "table_written", table, rows = addresses.len());
        Ok(())
    }

    pub async fn write_people(&self, people: &[Person]) -> StoreResult<()> {
        let table = self.tables.for_kind(EntityKind::Person);
        let workplaces = self.tables.for_kind(EntityKind::Workplace);
        let addresses = self.tables.for_kind(EntityKind::Address);
        self.prepare_table(
            table,
            &format!(
                "{table} (\
                 ID VARCHAR(32) PRIMARY KEY, \
                 NAME VARCHAR(255) NOT NULL, \
                 AGE BIGINT NOT NULL, \
                 MALE BIGINT NOT NULL, \
                 WORKPLACE_ID VARCHAR(32), \
                 ADDRESS_ID VARCHAR(32), \
                 FOREIGN KEY (WORKPLACE_ID) REFERENCES {workplaces}(ID), \
                 FOREIGN KEY (ADDRESS_ID) REFERENCES {addresses}(ID))"
            ),
        )
        .await?;

        let insert = format!(
            "INSERT INTO {table} (ID, NAME, AGE, MALE, WORKPLACE_ID, ADDRESS_ID) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        );
        let mut tx = self.pool.begin().await?;
        for person in people {
            sqlx::query(&insert)
                .bind(person.id.to_string())
                .bind(person.name.clone())
                .bind(i64::from(person.age))
                .bind(i64::from(person.male))
                .bind(person.workplace.as_ref().map(ToString::to_string))
                .bind(person.address.as_ref().map(ToString::to_string))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!(event = "table_written", table, rows = people.len());
        Ok(())
    }

    pub async fn read_workplaces(&self) -> StoreResult<Vec<Workplace>> {
        let table = self.tables.for_kind(EntityKind::Workplace);
        let rows = sqlx::query(&format!(
            "SELECT ID, NAME, LOCATION, EMPLOYEES FROM {table} ORDER BY ID"
        ))
        .fetch_all(&self.pool)
        .await?;

        let workplaces = rows
            .iter()
            .map(|row| -> StoreResult<Workplace> {
                let employees: Option<String> = column(row, 3, table)?;
                Ok(Workplace {
                    id: WorkplaceId::new(column::<String>(row, 0, table)?),
                    name: column(row, 1, table)?,
                    location: column(row, 2, table)?,
                    employees: split_ids::<PersonId>(employees.as_deref().unwrap_or_default()),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        info!(event = "table_read", table, rows = workplaces.len());
        Ok(workplaces)
    }

    pub async fn read_addresses(&self) -> StoreResult<Vec<Address>> {
        let table = self.tables.for_kind(EntityKind::Address);
        let rows = sqlx::query(&format!(
            "SELECT ID, STREET, CITY, COUNTRY, RESIDENT_ID FROM {table} ORDER BY ID"
        ))
        .fetch_all(&self.pool)
        .await?;

        let addresses = rows
            .iter()
            .map(|row| -> StoreResult<Address> {
                let resident: Option<String> = column(row, 4, table)?;
                Ok(Address {
                    id: AddressId::new(column::<String>(row, 0, table)?),
                    street: column(row, 1, table)?,
                    city: column(row, 2, table)?,
                    country: column(row, 3, table)?,
                    resident: resident.as_deref().and_then(optional_id::<PersonId>),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        info!(event = "table_read", table, rows = addresses.len());
        Ok(addresses)
    }

    pub async fn read_people(&self) -> StoreResult<Vec<Person>> {
        let table = self.tables.for_kind(EntityKind::Person);
        let rows = sqlx::query(&format!(
            "SELECT ID, NAME, AGE, MALE, WORKPLACE_ID, ADDRESS_ID FROM {table} ORDER BY ID"
        ))
        .fetch_all(&self.pool)
        .await?;

        let people = rows
            .iter()
            .map(|row| -> StoreResult<Person> {
                let id: String = column(row, 0, table)?;
                let age: i64 = column(row, 2, table)?;
                let male: i64 = column(row, 3, table)?;
                let workplace: Option<String> = column(row, 4, table)?;
                let address: Option<String> = column(row, 5, table)?;
                let male = match male {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(StoreError::Format(format!(
                            "{table} {id}: MALE value {other} is not 0 or 1"
                        )));
                    }
                };
                Ok(Person {
                    age: parse_age(&age.to_string(), &id)?,
                    male,
                    name: column(row, 1, table)?,
                    workplace: workplace.as_deref().and_then(optional_id::<WorkplaceId>),
                    address: address.as_deref().and_then(optional_id::<AddressId>),
                    id: PersonId::new(id),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        info!(event = "table_read", table, rows = people.len());
        Ok(people)
    }

    /// Create `table` from `definition`, dropping it first in recreate mode.
    async fn prepare_table(&self, table: &str, definition: &str) -> StoreResult<()> {
        if self.recreate {
            self.drop_table(table).await;
            self.pool
                .execute(format!("CREATE TABLE {definition}").as_str())
                .await?;
        } else {
            self.pool
                .execute(format!("CREATE TABLE IF NOT EXISTS {definition}").as_str())
                .await?;
        }
        debug!(event = "table_prepared", table, recreate = self.recreate);
        Ok(())
    }

    // A failed drop means the table did not exist yet.
    async fn drop_table(&self, table: &str) {
        let result = match self.backend {
            Backend::Postgres => self
                .pool
                .execute(format!("DROP TABLE {table} CASCADE").as_str())
                .await
                .map(|_| ()),
            Backend::Sqlite => self.drop_sqlite_table(table).await,
        };
        if let Err(err) = result {
            debug!(event = "drop_skipped", table, error = %err);
        }
    }

    async fn drop_sqlite_table(&self, table: &str) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *conn)
            .await?;
        let dropped = sqlx::query(&format!("DROP TABLE {table}"))
            .execute(&mut *conn)
            .await;
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *conn)
            .await?;
        dropped.map(|_| ())
    }
}

fn column<T>(row: &AnyRow, index: usize, table: &str) -> StoreResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    row.try_get::<T, _>(index).map_err(|err| match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Format(format!("{table} column {index}: {err}"))
        }
        other => StoreError::Database(other),
    })
}
