// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::Unit;

pub const EMP_EXC_PKG: Unit = (
    "hr",
    "emp_exc_pkg",
    "PACKAGE BODY emp_exc_pkg IS\n\
     invalid_salary EXCEPTION;\n\
     PRAGMA EXCEPTION_INIT(invalid_salary, -20010);\n\
     FUNCTION check_salary(p_salary NUMBER) RETURN NUMBER IS\n\
     BEGIN\n\
     IF p_salary < 0 THEN\n\
     RAISE invalid_salary;\n\
     END IF;\n\
     RETURN p_salary;\n\
     EXCEPTION\n\
     WHEN invalid_salary THEN\n\
     RAISE_APPLICATION_ERROR(-20010, 'salary must not be negative');\n\
     WHEN NO_DATA_FOUND THEN\n\
     RETURN 0;\n\
     WHEN OTHERS THEN\n\
     RAISE;\n\
     END check_salary;\n\
     END emp_exc_pkg;",
);
