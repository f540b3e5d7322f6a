//! Analysis domains: named column and service-code scopes.
//!
//! A [`Domain`] only narrows what is read. Rows whose service code falls
//! outside the domain are dropped, never rewritten.

use crate::error::CurError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named analysis scope used to prune columns and service codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Compute,
    Storage,
    Database,
    Networking,
    Serverless,
    Reservations,
    Tags,
    Security,
}

impl Domain {
    /// Every domain in the profile table.
    pub const ALL: [Domain; 8] = [
        Domain::Compute,
        Domain::Storage,
        Domain::Database,
        Domain::Networking,
        Domain::Serverless,
        Domain::Reservations,
        Domain::Tags,
        Domain::Security,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Domain::Compute => "compute",
            Domain::Storage => "storage",
            Domain::Database => "database",
            Domain::Networking => "networking",
            Domain::Serverless => "serverless",
            Domain::Reservations => "reservations",
            Domain::Tags => "tags",
            Domain::Security => "security",
        }
    }

    /// Logical columns the domain needs, in output order.
    ///
    /// `None` means every column: tag fields are dynamic, so the `tags`
    /// domain cannot name them up front.
    pub fn columns(self) -> Option<&'static [&'static str]> {
        let cols: &'static [&'static str] = match self {
            Domain::Compute => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "instance_type",
                "unblended_cost",
                "usage_amount",
                "region",
                "usage_account_id",
                "operating_system",
                "tenancy",
                "pricing_term",
                "line_item_type",
            ],
            Domain::Storage => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "usage_type",
                "unblended_cost",
                "usage_amount",
                "region",
                "usage_account_id",
                "volume_type",
                "storage_class",
            ],
            Domain::Database => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "instance_type",
                "unblended_cost",
                "usage_amount",
                "region",
                "usage_account_id",
                "database_engine",
            ],
            Domain::Networking => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "usage_type",
                "operation",
                "unblended_cost",
                "usage_amount",
                "region",
            ],
            Domain::Serverless => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "usage_type",
                "unblended_cost",
                "usage_amount",
                "region",
            ],
            Domain::Reservations => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "reservation_arn",
                "reservation_effective_cost",
                "reservation_unused_quantity",
                "savings_plan_arn",
                "savings_plan_effective_cost",
                "pricing_term",
                "unblended_cost",
                "public_ondemand_cost",
            ],
            Domain::Tags => return None,
            Domain::Security => &[
                "usage_start_date",
                "resource_id",
                "product_code",
                "usage_type",
                "operation",
                "unblended_cost",
                "usage_amount",
                "region",
                "usage_account_id",
            ],
        };
        Some(cols)
    }

    /// Provider service codes the domain cares about; `None` means all.
    pub fn service_codes(self) -> Option<&'static [&'static str]> {
        let codes: &'static [&'static str] = match self {
            Domain::Compute => &["AmazonEC2", "AmazonECS", "AmazonEKS"],
            Domain::Storage => &["AmazonS3", "AmazonEBS", "AmazonEFS", "AmazonGlacier"],
            Domain::Database => &[
                "AmazonRDS",
                "AmazonDynamoDB",
                "AmazonElastiCache",
                "AmazonRedshift",
                "AmazonDocDB",
                "AmazonNeptune",
            ],
            Domain::Networking => &[
                "AmazonVPC",
                "AmazonCloudFront",
                "AmazonRoute53",
                "AWSDataTransfer",
                "AWSELB",
            ],
            Domain::Serverless => &[
                "AWSLambda",
                "AmazonApiGateway",
                "AmazonSQS",
                "AmazonSNS",
                "AWSStepFunctions",
            ],
            Domain::Reservations => &[
                "AmazonEC2",
                "AmazonRDS",
                "AmazonElastiCache",
                "AmazonRedshift",
                "AmazonES",
            ],
            Domain::Tags => return None,
            Domain::Security => &[
                "AmazonCloudWatch",
                "AWSCloudTrail",
                "AWSKMS",
                "AWSSecurityHub",
                "AmazonGuardDuty",
            ],
        };
        Some(codes)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Domain {
    type Err = CurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Domain::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| CurError::UnknownDomain(s.to_string()))
    }
}
