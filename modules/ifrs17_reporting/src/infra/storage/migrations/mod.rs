//! Database migrations for the reporting module

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_institutions::Migration),
            Box::new(m20250301_000002_create_submissions::Migration),
            Box::new(m20250301_000003_create_metric_tables::Migration),
            Box::new(m20250301_000004_create_quality_checks_and_alerts::Migration),
            Box::new(m20250301_000005_create_users::Migration),
        ]
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Institutions {
    Table,
    Id,
    Name,
    RegistrationNumber,
    LicenseNumber,
    InstitutionType,
    Status,
    ContactPerson,
    Email,
    Phone,
    Address,
    City,
    Country,
    CreatedAt,
    UpdatedAt,
}

/// Columns shared by every institution-owned table
#[derive(DeriveIden, Clone, Copy)]
enum Owned {
    Id,
    InstitutionId,
    ReportingPeriod,
    Currency,
    Notes,
    CreatedAt,
    UpdatedAt,
}

fn id_column() -> ColumnDef {
    ColumnDef::new(Owned::Id)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn amount<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).decimal_len(15, 2).to_owned()
}

fn ratio<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).decimal_len(5, 2).to_owned()
}

/// Foreign key to `institutions.id`, deleted with the institution
fn institution_fk<T: IntoIden + Copy + 'static>(name: &str, table: T) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, Owned::InstitutionId)
        .to(Institutions::Table, Institutions::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

/// Per-currency table: id, institution, period, currency, `columns`, notes, timestamps
fn per_currency_table<T: IntoIden + Copy + 'static>(
    table: T,
    fk_name: &str,
    columns: Vec<ColumnDef>,
) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(table)
        .if_not_exists()
        .col(id_column())
        .col(ColumnDef::new(Owned::InstitutionId).integer().not_null())
        .col(ColumnDef::new(Owned::ReportingPeriod).date().not_null())
        .col(ColumnDef::new(Owned::Currency).string_len(3).not_null());
    for column in columns {
        stmt.col(column);
    }
    stmt.col(ColumnDef::new(Owned::Notes).text().not_null().default(""))
        .col(timestamp_column(Owned::CreatedAt))
        .col(timestamp_column(Owned::UpdatedAt))
        .foreign_key(&mut institution_fk(fk_name, table));
    stmt.to_owned()
}

/// Unique index over the natural key of a per-currency table
fn natural_key_index<T: IntoIden + Copy + 'static>(
    name: &str,
    table: T,
    extra: &[&'static str],
) -> IndexCreateStatement {
    let mut index = Index::create();
    index
        .name(name)
        .table(table)
        .col(Owned::InstitutionId)
        .col(Owned::ReportingPeriod)
        .col(Owned::Currency)
        .unique();
    for column in extra {
        index.col(Alias::new(*column));
    }
    index.to_owned()
}

mod m20250301_000001_create_institutions {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_institutions"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Institutions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Institutions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Institutions::Name)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Institutions::RegistrationNumber)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Institutions::LicenseNumber)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Institutions::InstitutionType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Institutions::Status)
                                .string_len(20)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Institutions::ContactPerson)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Institutions::Email).string_len(254).not_null())
                        .col(ColumnDef::new(Institutions::Phone).string_len(20).not_null())
                        .col(ColumnDef::new(Institutions::Address).text().not_null().default(""))
                        .col(ColumnDef::new(Institutions::City).string_len(100).not_null().default(""))
                        .col(
                            ColumnDef::new(Institutions::Country)
                                .string_len(100)
                                .not_null()
                                .default("Zimbabwe"),
                        )
                        .col(timestamp_column(Institutions::CreatedAt))
                        .col(timestamp_column(Institutions::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_institutions_status")
                        .table(Institutions::Table)
                        .col(Institutions::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Institutions::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_submissions {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_submissions"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Submissions::Table)
                        .if_not_exists()
                        .col(id_column())
                        .col(ColumnDef::new(Owned::InstitutionId).integer().not_null())
                        .col(ColumnDef::new(Owned::ReportingPeriod).date().not_null())
                        .col(
                            ColumnDef::new(Submissions::Status)
                                .string_len(20)
                                .not_null()
                                .default("draft"),
                        )
                        .col(ColumnDef::new(Submissions::UploadedFile).string_len(500))
                        .col(ColumnDef::new(Submissions::OriginalFilename).string_len(255))
                        .col(ColumnDef::new(Submissions::FileType).string_len(10))
                        .col(amount(Submissions::ContractualServiceMargin))
                        .col(amount(Submissions::RiskAdjustment))
                        .col(amount(Submissions::LossComponent))
                        .col(amount(Submissions::TotalLiabilities))
                        .col(amount(Submissions::EquityImpact))
                        .col(ratio(Submissions::ProfitMargin))
                        .col(ratio(Submissions::SolvencyRatio))
                        .col(ColumnDef::new(Owned::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(Submissions::SubmissionDate).timestamp_with_time_zone())
                        .col(timestamp_column(Owned::CreatedAt))
                        .col(timestamp_column(Owned::UpdatedAt))
                        .foreign_key(&mut institution_fk(
                            "fk_ifrs17_submissions_institution",
                            Submissions::Table,
                        ))
                        .to_owned(),
                )
                .await?;

            // No uniqueness: an institution may file several submissions per period
            manager
                .create_index(
                    Index::create()
                        .name("idx_ifrs17_submissions_institution_period")
                        .table(Submissions::Table)
                        .col(Owned::InstitutionId)
                        .col(Owned::ReportingPeriod)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Submissions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Submissions {
        #[sea_orm(iden = "ifrs17_submissions")]
        Table,
        Status,
        UploadedFile,
        OriginalFilename,
        FileType,
        ContractualServiceMargin,
        RiskAdjustment,
        LossComponent,
        TotalLiabilities,
        EquityImpact,
        ProfitMargin,
        SolvencyRatio,
        SubmissionDate,
    }
}

mod m20250301_000003_create_metric_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_metric_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(per_currency_table(
                    InsuranceRevenue::Table,
                    "fk_insurance_revenue_institution",
                    vec![
                        amount(InsuranceRevenue::TotalRevenue).not_null().to_owned(),
                        ratio(InsuranceRevenue::ServicePerformanceRatio),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_insurance_revenue_key",
                    InsuranceRevenue::Table,
                    &[],
                ))
                .await?;

            manager
                .create_table(per_currency_table(
                    CsmProfitability::Table,
                    "fk_csm_profitability_institution",
                    vec![
                        amount(CsmProfitability::OpeningCsm),
                        amount(CsmProfitability::ClosingCsm).not_null().to_owned(),
                        ratio(CsmProfitability::CsmProfitMargin),
                        ratio(CsmProfitability::CsmRoi),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_csm_profitability_key",
                    CsmProfitability::Table,
                    &[],
                ))
                .await?;

            manager
                .create_table(per_currency_table(
                    DiscountRates::Table,
                    "fk_discount_rates_institution",
                    vec![
                        ratio(DiscountRates::TotalDiscountRate).not_null().to_owned(),
                        amount(DiscountRates::NetFinanceResult),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_discount_rates_key",
                    DiscountRates::Table,
                    &[],
                ))
                .await?;

            manager
                .create_table(per_currency_table(
                    ReinsuranceHeld::Table,
                    "fk_reinsurance_held_institution",
                    vec![
                        amount(ReinsuranceHeld::TotalReinsuranceHeld)
                            .not_null()
                            .to_owned(),
                        ratio(ReinsuranceHeld::RiskTransferRatio),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_reinsurance_held_key",
                    ReinsuranceHeld::Table,
                    &[],
                ))
                .await?;

            manager
                .create_table(per_currency_table(
                    Ifrs4Transition::Table,
                    "fk_ifrs4_transition_institution",
                    vec![
                        ColumnDef::new(Ifrs4Transition::ImplementationStatus)
                            .string_len(20)
                            .not_null()
                            .to_owned(),
                        amount(Ifrs4Transition::EquityImpact),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_ifrs4_transition_key",
                    Ifrs4Transition::Table,
                    &[],
                ))
                .await?;

            manager
                .create_table(per_currency_table(
                    ContractGrouping::Table,
                    "fk_contract_grouping_institution",
                    vec![
                        ColumnDef::new(ContractGrouping::ProductLine)
                            .string_len(100)
                            .not_null()
                            .to_owned(),
                        ColumnDef::new(ContractGrouping::ContractType)
                            .string_len(100)
                            .not_null()
                            .to_owned(),
                        ColumnDef::new(ContractGrouping::MeasurementModel)
                            .string_len(10)
                            .not_null()
                            .to_owned(),
                        ColumnDef::new(ContractGrouping::RiskProfile)
                            .string_len(30)
                            .not_null()
                            .to_owned(),
                        ColumnDef::new(ContractGrouping::NumberOfContracts)
                            .integer()
                            .not_null()
                            .default(0)
                            .to_owned(),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_contract_grouping_key",
                    ContractGrouping::Table,
                    &["product_line", "contract_type"],
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ContractGrouping::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Ifrs4Transition::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReinsuranceHeld::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DiscountRates::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CsmProfitability::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InsuranceRevenue::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum InsuranceRevenue {
        Table,
        TotalRevenue,
        ServicePerformanceRatio,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum CsmProfitability {
        Table,
        OpeningCsm,
        ClosingCsm,
        CsmProfitMargin,
        CsmRoi,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum DiscountRates {
        Table,
        TotalDiscountRate,
        NetFinanceResult,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ReinsuranceHeld {
        Table,
        TotalReinsuranceHeld,
        RiskTransferRatio,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Ifrs4Transition {
        #[sea_orm(iden = "ifrs4_transition")]
        Table,
        ImplementationStatus,
        EquityImpact,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ContractGrouping {
        Table,
        ProductLine,
        ContractType,
        MeasurementModel,
        RiskProfile,
        NumberOfContracts,
    }
}

mod m20250301_000004_create_quality_checks_and_alerts {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_quality_checks_and_alerts"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let score = |name: DataQualityChecks| ratio(name).not_null().to_owned();
            let counter = |name: DataQualityChecks| {
                ColumnDef::new(name).integer().not_null().default(0).to_owned()
            };

            manager
                .create_table(per_currency_table(
                    DataQualityChecks::Table,
                    "fk_data_quality_checks_institution",
                    vec![
                        score(DataQualityChecks::CompletenessScore),
                        score(DataQualityChecks::AccuracyScore),
                        score(DataQualityChecks::ConsistencyScore),
                        score(DataQualityChecks::TimelinessScore),
                        score(DataQualityChecks::OverallQualityScore),
                        score(DataQualityChecks::DataGovernanceScore),
                        score(DataQualityChecks::ControlEffectivenessScore),
                        score(DataQualityChecks::AuditTrailCompleteness),
                        score(DataQualityChecks::RegulatoryComplianceScore),
                        ColumnDef::new(DataQualityChecks::ExchangeRateConsistency)
                            .boolean()
                            .not_null()
                            .to_owned(),
                        score(DataQualityChecks::CurrencyConversionAccuracy),
                        ColumnDef::new(DataQualityChecks::MultiCurrencyReconciliation)
                            .boolean()
                            .not_null()
                            .to_owned(),
                        counter(DataQualityChecks::MissingDataPoints),
                        counter(DataQualityChecks::AnomaliesDetected),
                        counter(DataQualityChecks::ValidationErrors),
                        counter(DataQualityChecks::CriticalIssues),
                        counter(DataQualityChecks::ResolvedIssues),
                        counter(DataQualityChecks::PendingIssues),
                        ColumnDef::new(DataQualityChecks::RemediationPlan)
                            .text()
                            .not_null()
                            .default("")
                            .to_owned(),
                    ],
                ))
                .await?;
            manager
                .create_index(natural_key_index(
                    "idx_data_quality_checks_key",
                    DataQualityChecks::Table,
                    &[],
                ))
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ComplianceAlerts::Table)
                        .if_not_exists()
                        .col(id_column())
                        .col(ColumnDef::new(Owned::InstitutionId).integer().not_null())
                        .col(ColumnDef::new(ComplianceAlerts::Title).string_len(200).not_null())
                        .col(ColumnDef::new(ComplianceAlerts::Description).text().not_null())
                        .col(ColumnDef::new(ComplianceAlerts::AlertType).string_len(30).not_null())
                        .col(ColumnDef::new(ComplianceAlerts::Severity).string_len(10).not_null())
                        .col(
                            ColumnDef::new(ComplianceAlerts::IsResolved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ComplianceAlerts::ResolvedAt).timestamp_with_time_zone())
                        .col(timestamp_column(Owned::CreatedAt))
                        .foreign_key(&mut institution_fk(
                            "fk_compliance_alerts_institution",
                            ComplianceAlerts::Table,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_compliance_alerts_institution")
                        .table(ComplianceAlerts::Table)
                        .col(Owned::InstitutionId)
                        .col(ComplianceAlerts::IsResolved)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ComplianceAlerts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DataQualityChecks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum DataQualityChecks {
        Table,
        CompletenessScore,
        AccuracyScore,
        ConsistencyScore,
        TimelinessScore,
        OverallQualityScore,
        DataGovernanceScore,
        ControlEffectivenessScore,
        AuditTrailCompleteness,
        RegulatoryComplianceScore,
        ExchangeRateConsistency,
        CurrencyConversionAccuracy,
        MultiCurrencyReconciliation,
        MissingDataPoints,
        AnomaliesDetected,
        ValidationErrors,
        CriticalIssues,
        ResolvedIssues,
        PendingIssues,
        RemediationPlan,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ComplianceAlerts {
        Table,
        Title,
        Description,
        AlertType,
        Severity,
        IsResolved,
        ResolvedAt,
    }
}

mod m20250301_000005_create_users {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(150)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string_len(128).not_null())
                        .col(timestamp_column(Users::CreatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Username,
        PasswordHash,
        CreatedAt,
    }
}
